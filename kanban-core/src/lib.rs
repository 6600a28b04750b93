//! Kanban Core - Board Types and Ordering
//!
//! Entity types, typed identifiers and the error taxonomy shared by every
//! crate in the workspace, plus the one reordering algorithm used both by the
//! server's order maintenance engine and by the client's optimistic mirror.

mod entities;
mod error;
mod identity;
pub mod order;
pub mod validation;

pub use entities::*;
pub use error::*;
pub use identity::*;
pub use order::{MovePlan, OrderRange, OrderShift, Placement, Sequenced};

/// Names of the columns every new board starts with.
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

/// Name of the board created on a user's first visit.
pub const MAIN_BOARD_NAME: &str = "My Tasks";
