use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{NetworkStore, SolarGridStore, StateStore, UniqueViolation, UserStore};
use crate::domain::{
    same_grid_name, Network, NewNetwork, NewSolarGrid, NewState, Page, PageRequest, SolarGrid,
    State, User,
};

/// Process-local store. Every table sits behind one lock so that cascades and
/// the grid name check happen in the same critical section as the write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    networks: BTreeMap<i64, Network>,
    grids: BTreeMap<i64, SolarGrid>,
    states: BTreeMap<i64, State>,
    users: BTreeMap<i64, User>,
    network_seq: i64,
    grid_seq: i64,
    state_seq: i64,
}

impl Tables {
    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.grids
            .values()
            .any(|g| Some(g.id) != except && same_grid_name(&g.name, name))
    }

    fn drop_grid(&mut self, grid_id: i64) -> bool {
        self.states.retain(|_, s| s.grid_id != grid_id);
        self.grids.remove(&grid_id).is_some()
    }
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl MemoryStore {
    pub fn add_user(&self, user: User) {
        self.tables.write().users.insert(user.id, user);
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let store = Self::default();
        for user in users {
            store.add_user(user);
        }
        store
    }
}

#[async_trait]
impl NetworkStore for MemoryStore {
    async fn insert(&self, network: NewNetwork) -> Result<Network> {
        let mut tables = self.tables.write();
        let id = next(&mut tables.network_seq);
        let network = network.into_network(id);
        tables.networks.insert(id, network.clone());
        Ok(network)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Network>> {
        Ok(self.tables.read().networks.get(&id).cloned())
    }

    async fn find_all_by_owner(&self, owner_id: i64) -> Result<Vec<Network>> {
        Ok(self
            .tables
            .read()
            .networks
            .values()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<Network>> {
        let tables = self.tables.read();
        Ok(Page::slice(tables.networks.values().cloned(), request))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.write();
        if tables.networks.remove(&id).is_none() {
            return Ok(false);
        }
        let orphans: Vec<i64> = tables
            .grids
            .values()
            .filter(|g| g.network_id == id)
            .map(|g| g.id)
            .collect();
        for grid_id in orphans {
            tables.drop_grid(grid_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl SolarGridStore for MemoryStore {
    async fn insert(&self, grid: NewSolarGrid) -> Result<SolarGrid> {
        let mut tables = self.tables.write();
        if !tables.networks.contains_key(&grid.network_id) {
            bail!("network {} does not exist", grid.network_id);
        }
        if tables.name_taken(&grid.name, None) {
            return Err(UniqueViolation {
                field: "name",
                value: grid.name,
            }
            .into());
        }
        let id = next(&mut tables.grid_seq);
        let grid = grid.into_grid(id);
        tables.grids.insert(id, grid.clone());
        Ok(grid)
    }

    async fn update(&self, grid: &SolarGrid) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.grids.contains_key(&grid.id) {
            bail!("solar grid {} does not exist", grid.id);
        }
        if tables.name_taken(&grid.name, Some(grid.id)) {
            return Err(UniqueViolation {
                field: "name",
                value: grid.name.clone(),
            }
            .into());
        }
        tables.grids.insert(grid.id, grid.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<SolarGrid>> {
        Ok(self.tables.read().grids.get(&id).cloned())
    }

    async fn find_by_name_ignore_case(&self, name: &str) -> Result<Option<SolarGrid>> {
        Ok(self
            .tables
            .read()
            .grids
            .values()
            .find(|g| same_grid_name(&g.name, name))
            .cloned())
    }

    async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool> {
        Ok(self.tables.read().name_taken(name, None))
    }

    async fn find_all_by_network(&self, network_id: i64) -> Result<Vec<SolarGrid>> {
        Ok(self
            .tables
            .read()
            .grids
            .values()
            .filter(|g| g.network_id == network_id)
            .cloned()
            .collect())
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<SolarGrid>> {
        let tables = self.tables.read();
        Ok(Page::slice(tables.grids.values().cloned(), request))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().drop_grid(id))
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn insert(&self, state: NewState) -> Result<State> {
        let mut tables = self.tables.write();
        if !tables.grids.contains_key(&state.grid_id) {
            bail!("solar grid {} does not exist", state.grid_id);
        }
        let id = next(&mut tables.state_seq);
        let state = state.into_state(id);
        tables.states.insert(id, state.clone());
        Ok(state)
    }

    async fn update(&self, state: &State) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.states.contains_key(&state.id) {
            bail!("state {} does not exist", state.id);
        }
        tables.states.insert(state.id, state.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<State>> {
        Ok(self.tables.read().states.get(&id).cloned())
    }

    async fn find_all_by_grid(&self, grid_id: i64) -> Result<Vec<State>> {
        Ok(self
            .tables
            .read()
            .states
            .values()
            .filter(|s| s.grid_id == grid_id)
            .cloned()
            .collect())
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<State>> {
        let tables = self.tables.read();
        Ok(Page::slice(tables.states.values().cloned(), request))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().states.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.token == token)
            .cloned())
    }
}
