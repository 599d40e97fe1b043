pub mod cli;
pub mod core;
pub mod scene;

// Re-export for convenience
pub use crate::core::error::{Error, Result};
pub use crate::core::manager::{Manager, ManagerSlot};
pub use crate::core::registrant::{Context, Registrant, RegistrantRef};
pub use crate::core::state::{GameState, UpdateOp};
