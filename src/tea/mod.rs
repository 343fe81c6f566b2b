//! The Elm Architecture (TEA) implementation for the query form.
//!
//! - `Model`: Pure controller state
//! - `Message`: Inputs to the update function
//! - `Command`: Outputs (side effects) from the update function
//! - `update`: The only place state changes

pub mod command;
pub mod message;
pub mod model;
pub mod update;

pub use command::Command;
pub use message::Message;
pub use model::{DismissId, Focus, Model, RequestId, View};
pub use update::update;
