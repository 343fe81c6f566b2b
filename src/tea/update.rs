//! Update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute. It performs no I/O.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::display::ResponseView;
use crate::query::QueryRequest;
use crate::{qlog, qlog_debug, qlog_warn};

use super::command::Command;
use super::message::Message;
use super::model::{Focus, Model, View, PRESS_FEEDBACK};

/// Rows moved per PageUp/PageDown in the response panel.
const SCROLL_STEP: u16 = 5;

/// Update function: Model + Message → Commands
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            model.dirty = true; // Keyboard input always triggers render
            update_key(model, key, &mut cmds);
        }

        Message::Resize(_, _) => {
            model.dirty = true;
        }

        Message::Paste(text) => {
            model.input.push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
            model.focus = Focus::Input;
            model.dirty = true;
        }

        Message::Tick => {
            let now = Instant::now();
            if model.pressed_until.is_some_and(|t| t <= now) {
                model.pressed_until = None;
                model.dirty = true;
            }
            if model.is_animating(now) {
                model.dirty = true;
            }
        }

        Message::QueryFinished { id, result } => {
            let View::Loading { id: current, .. } = model.view else {
                qlog_debug!("Message::QueryFinished id={:?} ignored: not loading", id);
                return cmds;
            };
            if current != id {
                qlog_debug!(
                    "Message::QueryFinished id={:?} ignored: superseded by {:?}",
                    id,
                    current
                );
                return cmds;
            }

            match result {
                Ok(resp) => {
                    qlog!(
                        "Query {:?} answered route={:?} steps={}",
                        id,
                        resp.route,
                        resp.workflow_steps.as_ref().map_or(0, Vec::len)
                    );
                    model.view = View::Response {
                        view: ResponseView::from_response(&resp),
                        shown_at: Instant::now(),
                    };
                    // Bring the new answer into view
                    model.scroll = 0;
                    model.dirty = true;
                }
                Err(failure) => {
                    qlog_warn!("Query {:?} failed: {}", id, failure);
                    show_error(model, failure.user_message(), &mut cmds);
                }
            }
        }

        Message::DismissError(id) => match model.view {
            View::Error { dismiss, .. } if dismiss == id => {
                qlog_debug!("Message::DismissError id={:?}", id);
                model.view = View::Idle;
                model.dirty = true;
            }
            _ => {
                qlog_debug!("Message::DismissError id={:?} ignored: stale", id);
            }
        },
    }

    cmds
}

/// Replace the current panel with an error banner and arm its dismiss timer.
fn show_error(model: &mut Model, message: String, cmds: &mut Vec<Command>) {
    qlog_warn!("UI Error: {}", message);
    leave_error(model, cmds);
    let dismiss = model.next_dismiss_id();
    model.view = View::Error { message, dismiss };
    model.dirty = true;
    cmds.push(Command::ScheduleDismiss {
        id: dismiss,
        after: model.error_dismiss,
    });
}

/// Cancel the pending dismiss timer if an error banner is showing.
fn leave_error(model: &Model, cmds: &mut Vec<Command>) {
    if let View::Error { dismiss, .. } = model.view {
        cmds.push(Command::CancelDismiss { id: dismiss });
    }
}

/// Submit the current input.
///
/// While a request is in flight the submit control is disabled and a plain
/// submit is dropped. `supersede` (picking an example) instead cancels the
/// in-flight request and starts over.
fn submit(model: &mut Model, supersede: bool, cmds: &mut Vec<Command>) {
    if let View::Loading { id, .. } = model.view {
        if !supersede {
            qlog_debug!("submit ignored: request {:?} in flight", id);
            return;
        }
        qlog_debug!("submit supersedes request {:?}", id);
        cmds.push(Command::CancelQuery { id });
    }

    // Only an accepted submit flashes the button
    model.pressed_until = Some(Instant::now() + PRESS_FEEDBACK);
    model.dirty = true;

    let request = match QueryRequest::new(&model.input) {
        Ok(request) => request,
        Err(e) => {
            // An in-flight request was cancelled above; the banner replaces it.
            show_error(model, e.user_message(), cmds);
            return;
        }
    };

    leave_error(model, cmds);
    let id = model.next_request_id();
    qlog!("Submitting query {:?} ({} chars)", id, request.query.len());
    model.view = View::Loading {
        id,
        started: Instant::now(),
    };
    model.scroll = 0;
    model.dirty = true;
    cmds.push(Command::SendQuery { id, request });
}

fn is_submit_key(key: &KeyEvent) -> bool {
    match key.code {
        // Primary modifier differs per platform; accept any of them.
        KeyCode::Enter => key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::ALT),
        // Fallback for terminals that cannot report modified Enter
        KeyCode::Char('s') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn update_key(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        cmds.push(Command::Quit);
        return;
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab => {
            if !model.examples.is_empty() {
                model.focus = model.focus.toggle();
            }
            return;
        }
        KeyCode::PageDown => {
            if matches!(model.view, View::Response { .. }) {
                model.scroll = model.scroll.saturating_add(SCROLL_STEP);
            }
            return;
        }
        KeyCode::PageUp => {
            model.scroll = model.scroll.saturating_sub(SCROLL_STEP);
            return;
        }
        _ => {}
    }

    match model.focus {
        Focus::Input => update_input_focus(model, key, cmds),
        Focus::Examples => update_examples_focus(model, key, cmds),
    }
}

fn update_input_focus(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    if is_submit_key(&key) {
        submit(model, false, cmds);
        return;
    }

    match key.code {
        KeyCode::Esc => cmds.push(Command::Quit),

        KeyCode::Enter => model.input.push('\n'),

        KeyCode::Backspace => {
            model.input.pop();
        }

        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            model.input.clear();
        }

        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => {}

        KeyCode::Char(c) => model.input.push(c),

        _ => {}
    }
}

fn update_examples_focus(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    let count = model.examples.len();
    if count == 0 {
        model.focus = Focus::Input;
        return;
    }

    match key.code {
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
            model.selected_example = (model.selected_example + 1) % count;
        }

        KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
            model.selected_example = model
                .selected_example
                .checked_sub(1)
                .unwrap_or(count - 1);
        }

        KeyCode::Enter | KeyCode::Char(' ') => {
            let Some(example) = model.examples.get(model.selected_example) else {
                return;
            };
            qlog_debug!("Example picked index={}", model.selected_example);
            model.input = example.clone();
            model.focus = Focus::Input;
            submit(model, true, cmds);
        }

        KeyCode::Esc => model.focus = Focus::Input,

        _ => {}
    }
}
