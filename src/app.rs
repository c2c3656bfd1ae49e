use anyhow::Result;
use std::sync::Arc;

use crate::{
    config::Config,
    ingest::{HistoryImport, IngestionPipeline},
    registry::{GridRegistry, NetworkRegistry, StateRegistry},
    repo::Repositories,
    simulation::SimulationQuery,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub repos: Repositories,
    pub services: Arc<FleetServices>,
}

impl AppState {
    pub async fn new(cfg: Config) -> Result<Self> {
        let repos = Repositories::new(&cfg).await?;
        Ok(Self::with_repositories(cfg, repos))
    }

    pub fn with_repositories(cfg: Config, repos: Repositories) -> Self {
        let services = Arc::new(FleetServices::new(&repos));
        Self {
            cfg,
            repos,
            services,
        }
    }
}

pub struct FleetServices {
    pub networks: NetworkRegistry,
    pub grids: GridRegistry,
    pub states: StateRegistry,
    pub ingestion: IngestionPipeline,
    pub history: HistoryImport,
    pub simulation: SimulationQuery,
}

impl FleetServices {
    pub fn new(repos: &Repositories) -> Self {
        let networks = NetworkRegistry::new(repos.networks.clone(), repos.users.clone());
        let grids = GridRegistry::new(repos.grids.clone(), repos.networks.clone());
        let states = StateRegistry::new(repos.states.clone(), repos.grids.clone());
        Self {
            ingestion: IngestionPipeline::new(networks.clone(), grids.clone()),
            history: HistoryImport::new(networks.clone(), grids.clone(), states.clone()),
            simulation: SimulationQuery::new(grids.clone()),
            networks,
            grids,
            states,
        }
    }
}
