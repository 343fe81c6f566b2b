use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::display::ResponseView;
use crate::tea::Focus;

/// Render loop period, 60 fps.
pub const FRAME_DURATION: Duration = Duration::from_micros(16_666);

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1
}

/// What the panel below the form shows, resolved for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelView {
    #[default]
    Idle,
    Loading {
        elapsed: Duration,
    },
    Response {
        view: ResponseView,
        /// Workflow nodes revealed so far.
        visible_steps: usize,
    },
    Error {
        message: String,
    },
}

impl PanelView {
    pub fn kind(&self) -> &'static str {
        match self {
            PanelView::Idle => "idle",
            PanelView::Loading { .. } => "loading",
            PanelView::Response { .. } => "response",
            PanelView::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    pub input: String,
    pub focus: Focus,
    pub examples: Vec<String>,
    pub selected_example: usize,
    pub panel: PanelView,
    pub submit_enabled: bool,
    /// Submit button press highlight
    pub button_pressed: bool,
    pub scroll: u16,
    pub endpoint: String,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            input: String::new(),
            focus: Focus::Input,
            examples: Vec::new(),
            selected_example: 0,
            panel: PanelView::Idle,
            submit_enabled: true,
            button_pressed: false,
            scroll: 0,
            endpoint: String::new(),
        }
    }
}

impl RenderState {
    pub fn is_loading(&self) -> bool {
        matches!(self.panel, PanelView::Loading { .. })
    }
}
