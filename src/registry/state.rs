use std::sync::Arc;
use tracing::info;

use crate::domain::{FleetError, FleetResult, NewState, Page, PageRequest, State};
use crate::repo::{SolarGridStore, StateStore};

/// Snapshots of a grid's age and output over time.
#[derive(Clone)]
pub struct StateRegistry {
    states: Arc<dyn StateStore>,
    grids: Arc<dyn SolarGridStore>,
}

impl StateRegistry {
    pub fn new(states: Arc<dyn StateStore>, grids: Arc<dyn SolarGridStore>) -> Self {
        Self { states, grids }
    }

    /// The first snapshot recorded for a grid is flagged as such.
    pub async fn create(&self, grid_id: i64, age: u32) -> FleetResult<State> {
        if self.grids.find_by_id(grid_id).await?.is_none() {
            return Err(FleetError::grid_not_found(grid_id));
        }
        let is_first_state = self.states.find_all_by_grid(grid_id).await?.is_empty();
        let state = self
            .states
            .insert(NewState::new(grid_id, age, is_first_state))
            .await?;
        info!(state_id = state.id, grid_id, age, is_first_state, "state recorded");
        Ok(state)
    }

    pub async fn update(&self, id: i64, age: u32) -> FleetResult<State> {
        let mut state = self.find_by_id(id).await?;
        state.set_age(age);
        self.states.update(&state).await?;
        info!(state_id = id, age, "state updated");
        Ok(state)
    }

    pub async fn find_by_id(&self, id: i64) -> FleetResult<State> {
        self.states
            .find_by_id(id)
            .await?
            .ok_or_else(|| FleetError::state_not_found(id))
    }

    pub async fn find_by_grid_id(&self, grid_id: i64) -> FleetResult<Vec<State>> {
        if self.grids.find_by_id(grid_id).await?.is_none() {
            return Err(FleetError::grid_not_found(grid_id));
        }
        Ok(self.states.find_all_by_grid(grid_id).await?)
    }

    pub async fn find_all(&self, request: PageRequest) -> FleetResult<Page<State>> {
        Ok(self.states.find_page(request).await?)
    }

    pub async fn delete_by_id(&self, id: i64) -> FleetResult<()> {
        if !self.states.delete(id).await? {
            return Err(FleetError::state_not_found(id));
        }
        info!(state_id = id, "state deleted");
        Ok(())
    }
}
