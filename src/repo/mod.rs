//! Persistence collaborators.
//!
//! Registries only see the store traits below. `memory` backs the default
//! build and the tests; `pg` backs the `db` feature.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::domain::{
    Network, NewNetwork, NewSolarGrid, NewState, Page, PageRequest, SolarGrid, State, User,
};

pub mod memory;
#[cfg(feature = "db")]
pub mod pg;

pub use memory::MemoryStore;

/// Raised by a store when an insert or update would break a uniqueness constraint.
#[derive(Debug, Error)]
#[error("unique constraint violated on {field}: {value}")]
pub struct UniqueViolation {
    pub field: &'static str,
    pub value: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetworkStore: Send + Sync {
    async fn insert(&self, network: NewNetwork) -> Result<Network>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Network>>;
    async fn find_all_by_owner(&self, owner_id: i64) -> Result<Vec<Network>>;
    async fn find_page(&self, request: PageRequest) -> Result<Page<Network>>;
    /// Deletes the network together with its grids and their states.
    async fn delete(&self, id: i64) -> Result<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SolarGridStore: Send + Sync {
    /// Fails with [`UniqueViolation`] when the name is already taken, ignoring case.
    async fn insert(&self, grid: NewSolarGrid) -> Result<SolarGrid>;
    /// Fails with [`UniqueViolation`] when the new name belongs to another grid.
    async fn update(&self, grid: &SolarGrid) -> Result<()>;
    async fn find_by_id(&self, id: i64) -> Result<Option<SolarGrid>>;
    async fn find_by_name_ignore_case(&self, name: &str) -> Result<Option<SolarGrid>>;
    async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool>;
    async fn find_all_by_network(&self, network_id: i64) -> Result<Vec<SolarGrid>>;
    async fn find_page(&self, request: PageRequest) -> Result<Page<SolarGrid>>;
    /// Deletes the grid together with its states.
    async fn delete(&self, id: i64) -> Result<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn insert(&self, state: NewState) -> Result<State>;
    async fn update(&self, state: &State) -> Result<()>;
    async fn find_by_id(&self, id: i64) -> Result<Option<State>>;
    async fn find_all_by_grid(&self, grid_id: i64) -> Result<Vec<State>>;
    async fn find_page(&self, request: PageRequest) -> Result<Page<State>>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_token(&self, token: &str) -> Result<Option<User>>;
}

/// Store handles shared by every service.
#[derive(Clone)]
pub struct Repositories {
    pub networks: Arc<dyn NetworkStore>,
    pub grids: Arc<dyn SolarGridStore>,
    pub states: Arc<dyn StateStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repositories {
    /// Users always come from configuration. Fleet records go to PostgreSQL when
    /// the `db` feature is enabled and `db.url` is set, otherwise to memory.
    pub async fn new(cfg: &Config) -> Result<Self> {
        let memory = Arc::new(MemoryStore::default());
        let mut loaded = 0;
        for user in cfg.auth.active_users() {
            memory.add_user(user.clone().into());
            loaded += 1;
        }
        info!(users = loaded, "user directory loaded");

        #[cfg(feature = "db")]
        {
            if let Some(url) = cfg.db.url.as_deref().filter(|url| !url.is_empty()) {
                let pg = Arc::new(pg::PgStore::connect(url, cfg.db.max_connections).await?);
                info!("using PostgreSQL store");
                return Ok(Self {
                    networks: pg.clone(),
                    grids: pg.clone(),
                    states: pg,
                    users: memory,
                });
            }
        }

        info!("using in-memory store");
        Ok(Self::from_memory(memory))
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            networks: store.clone(),
            grids: store.clone(),
            states: store.clone(),
            users: store,
        }
    }
}
