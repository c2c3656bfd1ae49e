use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::output::compute_output;

/// Point-in-time snapshot of a grid's age and output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: i64,
    pub grid_id: i64,
    pub age: u32,
    pub power_output: f64,
    /// Set on the first snapshot recorded for a grid.
    pub is_first_state: bool,
    pub created_at: DateTime<Utc>,
}

impl State {
    pub fn set_age(&mut self, age: u32) {
        self.age = age;
        self.power_output = compute_output(age);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewState {
    pub grid_id: i64,
    pub age: u32,
    pub power_output: f64,
    pub is_first_state: bool,
    pub created_at: DateTime<Utc>,
}

impl NewState {
    pub fn new(grid_id: i64, age: u32, is_first_state: bool) -> Self {
        Self {
            grid_id,
            age,
            power_output: compute_output(age),
            is_first_state,
            created_at: Utc::now(),
        }
    }

    pub fn into_state(self, id: i64) -> State {
        State {
            id,
            grid_id: self.grid_id,
            age: self.age,
            power_output: self.power_output,
            is_first_state: self.is_first_state,
            created_at: self.created_at,
        }
    }
}
