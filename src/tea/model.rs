//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure controller state - no channels, no handles, no runtime infrastructure.

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::display::{visible_steps, ResponseView};
use crate::render::{next_version, PanelView, RenderState};

/// How long the submit button stays highlighted after it fires.
pub const PRESS_FEEDBACK: Duration = Duration::from_millis(150);

/// Identifies one submission. A completion only counts if its id is the
/// one currently loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Identifies one error banner, so a late timer cannot dismiss a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DismissId(pub u64);

/// Which part of the form receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Examples,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Input => Focus::Examples,
            Focus::Examples => Focus::Input,
        }
    }
}

/// The one panel currently shown below the form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Idle,
    Loading {
        id: RequestId,
        started: Instant,
    },
    Response {
        view: ResponseView,
        shown_at: Instant,
    },
    Error {
        message: String,
        dismiss: DismissId,
    },
}

impl View {
    pub fn is_loading(&self) -> bool {
        matches!(self, View::Loading { .. })
    }
}

/// Pure controller state - the single source of truth.
pub struct Model {
    pub view: View,

    // Form state
    pub input: String,
    pub focus: Focus,
    pub examples: Vec<String>,
    pub selected_example: usize,

    /// Response panel scroll offset in rows.
    pub scroll: u16,
    /// Submit button press highlight expires at this instant.
    pub pressed_until: Option<Instant>,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,

    // Config (immutable after init)
    pub endpoint: String,
    pub error_dismiss: Duration,

    next_request: u64,
    next_dismiss: u64,
}

impl Model {
    pub fn new(config: &Config) -> Self {
        Self {
            view: View::Idle,
            input: String::new(),
            focus: Focus::Input,
            examples: config.examples.clone(),
            selected_example: 0,
            scroll: 0,
            pressed_until: None,
            dirty: true,
            endpoint: config.endpoint.clone(),
            error_dismiss: config.error_dismiss(),
            next_request: 0,
            next_dismiss: 0,
        }
    }

    /// The submit control is disabled while a request is in flight.
    pub fn submit_enabled(&self) -> bool {
        !self.view.is_loading()
    }

    pub fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    pub fn next_dismiss_id(&mut self) -> DismissId {
        self.next_dismiss += 1;
        DismissId(self.next_dismiss)
    }

    /// True while something on screen changes without input: the loading
    /// spinner, a workflow trail still revealing, or the press highlight.
    pub fn is_animating(&self, now: Instant) -> bool {
        let pressed = self.pressed_until.is_some();
        match &self.view {
            View::Loading { .. } => true,
            View::Response { view, shown_at } => {
                let shown =
                    visible_steps(view.steps.len(), now.saturating_duration_since(*shown_at));
                pressed || shown < view.steps.len()
            }
            View::Idle | View::Error { .. } => pressed,
        }
    }

    /// Create an immutable snapshot for the render thread.
    ///
    /// Each snapshot gets a monotonically increasing version number so the
    /// render thread can skip redundant draws.
    pub fn snapshot(&self) -> RenderState {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> RenderState {
        let panel = match &self.view {
            View::Idle => PanelView::Idle,
            View::Loading { started, .. } => PanelView::Loading {
                elapsed: now.saturating_duration_since(*started),
            },
            View::Response { view, shown_at } => PanelView::Response {
                view: view.clone(),
                visible_steps: visible_steps(
                    view.steps.len(),
                    now.saturating_duration_since(*shown_at),
                ),
            },
            View::Error { message, .. } => PanelView::Error {
                message: message.clone(),
            },
        };

        RenderState {
            version: next_version(),
            input: self.input.clone(),
            focus: self.focus,
            examples: self.examples.clone(),
            selected_example: self.selected_example,
            panel,
            submit_enabled: self.submit_enabled(),
            button_pressed: self.pressed_until.is_some_and(|t| t > now),
            scroll: self.scroll,
            endpoint: self.endpoint.clone(),
        }
    }
}
