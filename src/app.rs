use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};
use crossterm::event::{self, Event, KeyEventKind};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::actors::{ActorHandle, TickActor};
use crate::config::Config;
use crate::query::QueryClient;
use crate::render::RenderState;
use crate::tea::{update, Command, DismissId, Message, Model, RequestId};
use crate::util::cancellable;
use crate::{qlog_debug, qlog_trace, qlog_warn, Result};

const MAX_BG_MESSAGES: usize = 50;

pub struct LogicThread;

impl LogicThread {
    pub fn run(
        config: Config,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(config, state_tx, shutdown))
    }

    async fn run_async(
        config: Config,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        qlog_debug!(
            "LogicThread::run_async endpoint={} examples={}",
            config.endpoint,
            config.examples.len()
        );
        let client = QueryClient::new(&config.endpoint, config.request_timeout())?;
        let mut model = Model::new(&config);

        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();
        let tick = TickActor::new(msg_tx.clone()).spawn();
        let mut effects = Effects::new(client, msg_tx);

        flush_state(&state_tx, &mut model);

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Terminal input (priority)
            while event::poll(Duration::ZERO)? {
                let msg = match event::read()? {
                    // Enhanced keyboard mode reports releases too
                    Event::Key(key) if key.kind == KeyEventKind::Release => continue,
                    Event::Key(key) => Message::Key(key),
                    Event::Paste(text) => Message::Paste(text),
                    Event::Resize(w, h) => Message::Resize(w, h),
                    _ => continue,
                };

                if dispatch(&mut model, msg, &mut effects) {
                    shutdown.store(true, Ordering::Relaxed);
                    tick.shutdown();
                    effects.shutdown();
                    return Ok(());
                }

                flush_state(&state_tx, &mut model);
            }

            // Background messages (bounded)
            for _ in 0..MAX_BG_MESSAGES {
                let Ok(msg) = msg_rx.try_recv() else { break };
                if dispatch(&mut model, msg, &mut effects) {
                    shutdown.store(true, Ordering::Relaxed);
                    tick.shutdown();
                    effects.shutdown();
                    return Ok(());
                }
            }

            flush_state(&state_tx, &mut model);

            tokio::time::sleep(Duration::from_micros(500)).await;
        }

        tick.shutdown();
        effects.shutdown();
        Ok(())
    }
}

/// Run one message through `update` and execute the resulting commands.
/// Returns true when the app should quit.
pub fn dispatch(model: &mut Model, msg: Message, effects: &mut Effects) -> bool {
    effects.settle(&msg);
    let mut quit = false;
    for cmd in update(model, msg) {
        quit |= effects.execute(cmd);
    }
    quit
}

/// Executes commands on the tokio runtime and tracks the tasks they start.
///
/// Every in-flight query and armed dismiss timer is registered by id so a
/// later command can cancel it. Results come back on `msg_tx`.
pub struct Effects {
    client: QueryClient,
    msg_tx: mpsc::UnboundedSender<Message>,
    queries: HashMap<RequestId, ActorHandle>,
    dismissals: HashMap<DismissId, ActorHandle>,
}

impl Effects {
    pub fn new(client: QueryClient, msg_tx: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            client,
            msg_tx,
            queries: HashMap::new(),
            dismissals: HashMap::new(),
        }
    }

    pub fn pending_queries(&self) -> usize {
        self.queries.len()
    }

    pub fn pending_dismissals(&self) -> usize {
        self.dismissals.len()
    }

    /// Forget the task that produced `msg`; it has finished.
    pub fn settle(&mut self, msg: &Message) {
        match msg {
            Message::QueryFinished { id, .. } => {
                self.queries.remove(id);
            }
            Message::DismissError(id) => {
                self.dismissals.remove(id);
            }
            _ => {}
        }
    }

    /// Must be called from within a tokio runtime. Returns true on `Quit`.
    pub fn execute(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::SendQuery { id, request } => {
                qlog_debug!("Command::SendQuery id={:?} url={}", id, self.client.url());
                let cancel = CancellationToken::new();
                let token = cancel.clone();
                let client = self.client.clone();
                let tx = self.msg_tx.clone();

                tokio::spawn(async move {
                    match cancellable(token, client.submit(&request)).await {
                        Some(result) => {
                            let _ = tx.send(Message::QueryFinished { id, result });
                        }
                        None => qlog_debug!("Query {:?} cancelled", id),
                    }
                });

                if let Some(old) = self.queries.insert(id, ActorHandle::new(cancel)) {
                    qlog_warn!("SendQuery reused id {:?}; cancelling the older task", id);
                    old.shutdown();
                }
            }

            Command::CancelQuery { id } => {
                qlog_debug!("Command::CancelQuery id={:?}", id);
                if let Some(handle) = self.queries.remove(&id) {
                    handle.shutdown();
                }
            }

            Command::ScheduleDismiss { id, after } => {
                qlog_debug!("Command::ScheduleDismiss id={:?} after={:?}", id, after);
                let cancel = CancellationToken::new();
                let token = cancel.clone();
                let tx = self.msg_tx.clone();

                tokio::spawn(async move {
                    if cancellable(token, tokio::time::sleep(after)).await.is_some() {
                        let _ = tx.send(Message::DismissError(id));
                    }
                });

                self.dismissals.insert(id, ActorHandle::new(cancel));
            }

            Command::CancelDismiss { id } => {
                qlog_debug!("Command::CancelDismiss id={:?}", id);
                if let Some(handle) = self.dismissals.remove(&id) {
                    handle.shutdown();
                }
            }

            Command::Quit => {
                qlog_debug!("Command::Quit");
                return true;
            }
        }

        false
    }

    /// Cancel every tracked task.
    pub fn shutdown(&mut self) {
        qlog_debug!(
            "Shutting down {} queries, {} timers",
            self.queries.len(),
            self.dismissals.len()
        );
        for (_, handle) in self.queries.drain() {
            handle.shutdown();
        }
        for (_, handle) in self.dismissals.drain() {
            handle.shutdown();
        }
    }
}

/// Offer a fresh snapshot to the render thread without blocking.
///
/// While the render thread still holds an unread frame the model stays
/// dirty, so the next loop iteration offers a newer snapshot instead.
fn flush_state(state_tx: &Sender<RenderState>, model: &mut Model) {
    if !model.dirty {
        return;
    }
    let state = model.snapshot();
    let (version, panel) = (state.version, state.panel.kind());
    match state_tx.try_send(state) {
        Ok(()) => {
            qlog_trace!("Snapshot v{} panel={}", version, panel);
            model.dirty = false;
        }
        Err(TrySendError::Full(_)) => qlog_trace!("Snapshot v{} deferred", version),
        Err(TrySendError::Disconnected(_)) => model.dirty = false,
    }
}
