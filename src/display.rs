//! Presentation policy: labels, placeholders, and the response view model.
//!
//! None of these strings are part of the wire contract.

use std::time::Duration;

use crate::query::{non_empty, QueryResponse};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a query";
pub const FALLBACK_STATUS: &str = "An error occurred";
pub const FALLBACK_REJECTED: &str = "Failed to get response";
pub const FALLBACK_UNEXPECTED: &str = "An unexpected error occurred";

pub const NO_VALUE: &str = "-";
pub const NO_RESPONSE: &str = "No response generated";
pub const NO_WORKFLOW_STEPS: &str = "No workflow steps recorded";
pub const LOADING_STEP: &str = "Initializing...";

/// Delay between consecutive workflow nodes appearing.
pub const STEP_REVEAL_DELAY: Duration = Duration::from_millis(100);

/// Backend route identifiers and their human labels.
const ROUTE_LABELS: [(&str, &str); 3] = [
    ("Retrieve_QnA", "Medical Q&A Database"),
    ("Retrieve_Device", "Medical Device Manuals"),
    ("Web_Search", "Web Search"),
];

/// Translate a route id. Unknown ids pass through unchanged.
pub fn route_label(route: &str) -> &str {
    ROUTE_LABELS
        .iter()
        .find(|(id, _)| *id == route)
        .map(|(_, label)| *label)
        .unwrap_or(route)
}

/// Shortcut hint for the platform's primary modifier.
pub fn submit_hint() -> &'static str {
    if cfg!(target_os = "macos") {
        "Cmd+Enter"
    } else {
        "Ctrl+Enter"
    }
}

/// Everything the response panel shows, already resolved to display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseView {
    pub route: String,
    pub source: String,
    pub relevance: String,
    pub body: String,
    /// Empty means "show the no-steps placeholder".
    pub steps: Vec<String>,
}

impl ResponseView {
    pub fn from_response(resp: &QueryResponse) -> Self {
        let route = non_empty(resp.route.as_deref())
            .map(route_label)
            .unwrap_or(NO_VALUE);

        Self {
            route: route.to_string(),
            source: or_placeholder(resp.source.as_deref(), NO_VALUE),
            relevance: or_placeholder(resp.is_relevant.as_deref(), NO_VALUE),
            body: or_placeholder(resp.response.as_deref(), NO_RESPONSE),
            steps: resp.workflow_steps.clone().unwrap_or_default(),
        }
    }

    /// Plain-text rendering for non-interactive output.
    pub fn to_plain_text(&self) -> String {
        let trail = if self.steps.is_empty() {
            NO_WORKFLOW_STEPS.to_string()
        } else {
            self.steps.join(" → ")
        };
        format!(
            "Route:     {}\nSource:    {}\nRelevant:  {}\nWorkflow:  {}\n\n{}\n",
            self.route, self.source, self.relevance, trail, self.body
        )
    }
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    non_empty(value).unwrap_or(placeholder).to_string()
}

/// Delay before workflow node `index` appears.
pub fn reveal_delay(index: usize) -> Duration {
    STEP_REVEAL_DELAY * index as u32
}

/// How many of `total` nodes are visible `elapsed` after the response was shown.
pub fn visible_steps(total: usize, elapsed: Duration) -> usize {
    (0..total)
        .take_while(|&i| elapsed >= reveal_delay(i))
        .count()
}
