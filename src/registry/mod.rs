//! Services wrapping the stores with the fleet's business rules.

pub mod grid;
pub mod network;
pub mod state;

pub use grid::GridRegistry;
pub use network::NetworkRegistry;
pub use state::StateRegistry;

use crate::domain::FleetError;
use crate::repo::UniqueViolation;

/// Maps a store write failure, keeping uniqueness violations distinguishable.
pub(crate) fn classify_write(err: anyhow::Error) -> FleetError {
    match err.downcast::<UniqueViolation>() {
        Ok(violation) => FleetError::grid_name_taken(&violation.value),
        Err(err) => FleetError::Storage(err),
    }
}
