//! Tick actor: a steady animation clock.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::tea::Message;
use crate::qlog_debug;

use super::ActorHandle;

/// Fast enough for the 100 ms workflow reveal and the 80 ms spinner.
const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Actor that sends `Message::Tick` at a fixed interval.
pub struct TickActor {
    msg_tx: mpsc::UnboundedSender<Message>,
    interval: Duration,
}

impl TickActor {
    pub fn new(msg_tx: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            msg_tx,
            interval: TICK_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn spawn(self) -> ActorHandle {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        qlog_debug!("TickActor::spawn interval={:?}", self.interval);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel_clone.cancelled() => {
                        qlog_debug!("TickActor cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        if self.msg_tx.send(Message::Tick).is_err() {
                            qlog_debug!("TickActor: message channel closed");
                            break;
                        }
                    }
                }
            }
        });

        ActorHandle::new(cancel)
    }
}
