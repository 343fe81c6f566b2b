//! Actor system for background tasks.
//!
//! Each actor is an independent tokio task that communicates with the logic
//! thread via message passing. The tick actor drives animation (loading
//! spinner, workflow reveal, press highlight). Query requests and dismiss
//! timers are one-shot tasks that share the same `ActorHandle` for
//! cancellation.
//!
//! NOTE: Keyboard input is handled synchronously in the logic thread,
//! not via an actor, for minimum latency.

pub mod tick;

use tokio_util::sync::CancellationToken;

pub use tick::TickActor;

/// Handle to a running actor or task, used for cancellation.
#[derive(Debug)]
pub struct ActorHandle {
    cancel: CancellationToken,
}

impl ActorHandle {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Signal the task to stop. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
