//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function - they represent side effects
//! to be executed by the runtime.

use std::time::Duration;

use crate::query::QueryRequest;

use super::model::{DismissId, RequestId};

/// Output commands from the update function.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    // Network
    SendQuery { id: RequestId, request: QueryRequest },
    CancelQuery { id: RequestId },

    // Error banner timer
    ScheduleDismiss { id: DismissId, after: Duration },
    CancelDismiss { id: DismissId },

    // App lifecycle
    Quit,
}
