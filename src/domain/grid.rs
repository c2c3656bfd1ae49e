use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{FleetError, FleetResult};
use super::output::compute_output;

/// Longest grid name the stores accept, in characters.
pub const GRID_NAME_MAX_CHARS: usize = 500;

/// A single power-producing installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarGrid {
    pub id: i64,
    /// Globally unique, compared case-insensitively.
    pub name: String,
    /// Days since installation.
    pub age: u32,
    /// Output in kW derived from `age` when the grid was last persisted.
    pub power_output: f64,
    pub created_at: DateTime<Utc>,
    pub network_id: i64,
}

impl SolarGrid {
    /// Changes the age and restamps the derived output.
    pub fn set_age(&mut self, age: u32) {
        self.age = age;
        self.power_output = compute_output(age);
    }
}

/// A grid that has not been persisted yet. The output is always derived from the age.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSolarGrid {
    pub name: String,
    pub age: u32,
    pub power_output: f64,
    pub network_id: i64,
    pub created_at: DateTime<Utc>,
}

impl NewSolarGrid {
    pub fn new(name: impl Into<String>, age: u32, network_id: i64) -> Self {
        Self {
            name: name.into(),
            age,
            power_output: compute_output(age),
            network_id,
            created_at: Utc::now(),
        }
    }

    pub fn into_grid(self, id: i64) -> SolarGrid {
        SolarGrid {
            id,
            name: self.name,
            age: self.age,
            power_output: self.power_output,
            created_at: self.created_at,
            network_id: self.network_id,
        }
    }
}

/// Trims a grid name and checks it is neither blank nor longer than the stores allow.
pub fn normalize_grid_name(name: &str) -> FleetResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FleetError::InvalidInput("solar grid name is blank".into()));
    }
    if name.chars().count() > GRID_NAME_MAX_CHARS {
        return Err(FleetError::InvalidInput(format!(
            "solar grid name is longer than {GRID_NAME_MAX_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

/// Case-insensitive name comparison used for the grid uniqueness rule.
pub fn same_grid_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
