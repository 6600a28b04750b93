//! Kanban client library exports.
//!
//! [`mirror::BoardMirror`] applies drag gestures to a local copy of a board
//! before the server confirms them; [`session::BoardSession`] sends the
//! resulting move and re-syncs from the server afterwards.

pub mod api_client;
pub mod config;
pub mod mirror;
pub mod session;

pub use api_client::{ApiClientError, BoardApi, RestClient};
pub use config::{ClientConfig, ConfigError};
pub use mirror::{BoardMirror, DragState, DropTarget, MoveCommand};
pub use session::BoardSession;
