use thiserror::Error;

/// Errors raised by the registries, the ingestion pipeline and simulation queries.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type FleetResult<T> = Result<T, FleetError>;

impl FleetError {
    pub fn network_not_found(id: i64) -> Self {
        Self::NotFound(format!("Network {id} is not found"))
    }

    pub fn grid_not_found(id: i64) -> Self {
        Self::NotFound(format!("Solar grid {id} is not found"))
    }

    pub fn state_not_found(id: i64) -> Self {
        Self::NotFound(format!("State {id} is not found"))
    }

    pub fn user_not_found(id: i64) -> Self {
        Self::NotFound(format!("User {id} is not found"))
    }

    pub fn no_networks_for(owner_id: i64) -> Self {
        Self::NotFound(format!("User {owner_id} has no network"))
    }

    pub fn grid_name_taken(name: &str) -> Self {
        Self::AlreadyExists(format!("Solar grid with the name '{name}' already exists"))
    }

    /// Errors that concern a single batch element rather than the whole batch.
    pub fn is_element_local(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::AlreadyExists(_))
    }
}
