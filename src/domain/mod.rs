pub mod error;
pub mod grid;
pub mod network;
pub mod output;
pub mod page;
pub mod state;
pub mod user;

pub use error::*;
pub use grid::*;
pub use network::*;
pub use output::*;
pub use page::*;
pub use state::*;
pub use user::*;
