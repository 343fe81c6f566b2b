//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function - they come from the
//! keyboard, the tick actor, or completed command tasks.

use crossterm::event::KeyEvent;

use crate::query::{QueryFailure, QueryResponse};

use super::model::{DismissId, RequestId};

/// Input messages to the update function.
#[derive(Debug)]
pub enum Message {
    // Keyboard/terminal events
    Key(KeyEvent),
    Resize(u16, u16),
    /// Bracketed paste into the query input.
    Paste(String),

    /// Animation clock from the tick actor.
    Tick,

    /// A query task finished, successfully or not.
    QueryFinished {
        id: RequestId,
        result: Result<QueryResponse, QueryFailure>,
    },

    /// An error banner's dismiss timer fired.
    DismissError(DismissId),
}
