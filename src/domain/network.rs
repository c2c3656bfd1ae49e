use serde::{Deserialize, Serialize};

use super::error::{FleetError, FleetResult};

/// Longest network name the stores accept, in characters.
pub const NETWORK_NAME_MAX_CHARS: usize = 50;

/// Trims a network name and checks it is neither blank nor too long.
pub fn normalize_network_name(name: &str) -> FleetResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FleetError::InvalidInput("network name is blank".into()));
    }
    if name.chars().count() > NETWORK_NAME_MAX_CHARS {
        return Err(FleetError::InvalidInput(format!(
            "network name is longer than {NETWORK_NAME_MAX_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

/// A named collection of solar grids owned by one user. Names are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNetwork {
    pub name: String,
    pub owner_id: i64,
}

impl NewNetwork {
    pub fn new(name: impl Into<String>, owner_id: i64) -> Self {
        Self {
            name: name.into(),
            owner_id,
        }
    }

    pub fn into_network(self, id: i64) -> Network {
        Network {
            id,
            name: self.name,
            owner_id: self.owner_id,
        }
    }
}
