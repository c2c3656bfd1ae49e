//! Historical uploads: named measurements turned into durable states.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use super::{BatchElement, GridDescriptor, RejectedElement};
use crate::domain::{Caller, FleetError, FleetResult, Network, SolarGrid, State};
use crate::registry::{GridRegistry, NetworkRegistry, StateRegistry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedState {
    pub state_id: i64,
    pub grid_id: i64,
    pub name: String,
    pub age: u32,
    pub power_output: f64,
    pub is_first_state: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryReport {
    /// Network created for grids that did not exist yet, if any.
    pub network_id: Option<i64>,
    pub total_output: f64,
    pub recorded: Vec<RecordedState>,
    pub rejected: Vec<RejectedElement>,
}

impl fmt::Display for HistoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Produced: {:.2} kWh", self.total_output)?;
        writeln!(f, "Network:")?;
        for state in &self.recorded {
            writeln!(f, "{} in use for {} days", state.name, state.age)?;
        }
        Ok(())
    }
}

/// Records one state per measurement. Measurements name their grid; unknown
/// grids are created under a network named after the caller, which is created
/// on first need. A name held by another user's grid is rejected.
#[derive(Clone)]
pub struct HistoryImport {
    networks: NetworkRegistry,
    grids: GridRegistry,
    states: StateRegistry,
}

impl HistoryImport {
    pub fn new(networks: NetworkRegistry, grids: GridRegistry, states: StateRegistry) -> Self {
        Self {
            networks,
            grids,
            states,
        }
    }

    pub async fn record_document(&self, caller: &Caller, raw: &[u8]) -> FleetResult<HistoryReport> {
        let batch = super::parse_loose_batch(raw)?;
        self.record(caller, batch).await
    }

    pub async fn record(&self, caller: &Caller, batch: Vec<BatchElement>) -> FleetResult<HistoryReport> {
        let mut network: Option<Network> = None;
        let mut report = HistoryReport {
            network_id: None,
            total_output: 0.0,
            recorded: Vec::new(),
            rejected: Vec::new(),
        };

        for (index, element) in batch.into_iter().enumerate() {
            let name = element.name;
            match self.record_one(caller, element.parsed, &mut network).await {
                Ok((grid, state)) => {
                    report.total_output += state.power_output;
                    report.recorded.push(RecordedState {
                        state_id: state.id,
                        grid_id: grid.id,
                        name: grid.name,
                        age: state.age,
                        power_output: state.power_output,
                        is_first_state: state.is_first_state,
                    });
                }
                Err(err) if err.is_element_local() => {
                    warn!(index, error = %err, "history element rejected");
                    report.rejected.push(RejectedElement {
                        index,
                        name,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        report.network_id = network.map(|n| n.id);
        info!(
            owner_id = caller.id,
            recorded = report.recorded.len(),
            rejected = report.rejected.len(),
            "history recorded"
        );
        Ok(report)
    }

    async fn record_one(
        &self,
        caller: &Caller,
        parsed: FleetResult<GridDescriptor>,
        network: &mut Option<Network>,
    ) -> FleetResult<(SolarGrid, State)> {
        let spec = parsed?.into_spec()?;

        let grid = match self.grids.find_by_name(&spec.name).await? {
            Some(grid) => {
                let owner = self.networks.find_by_id(grid.network_id).await?.owner_id;
                if owner != caller.id {
                    return Err(FleetError::grid_name_taken(&spec.name));
                }
                grid
            }
            None => {
                let network_id = match network.as_ref().map(|n| n.id) {
                    Some(id) => id,
                    None => {
                        let created = self.networks.create(&caller.username, caller.id).await?;
                        let id = created.id;
                        *network = Some(created);
                        id
                    }
                };
                self.grids.create(&spec.name, spec.age, network_id).await?
            }
        };

        let state = self.states.create(grid.id, spec.age).await?;
        Ok((grid, state))
    }
}
