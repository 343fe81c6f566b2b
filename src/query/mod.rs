//! Wire contract for the `/query` backend.
//!
//! One JSON request, one JSON reply. Everything about how the reply is shown
//! lives in `crate::display`; this module only decides whether a reply is a
//! success and, if not, which message the user should see.

pub mod client;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::display::{
    EMPTY_QUERY_MESSAGE, FALLBACK_REJECTED, FALLBACK_STATUS, FALLBACK_UNEXPECTED,
};
use crate::{Error, Result};

pub use client::QueryClient;

/// Body of `POST /query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

impl QueryRequest {
    /// Build a request from raw input. The query is trimmed; blank input is
    /// a validation error and must never reach the network.
    pub fn new(raw: &str) -> Result<Self> {
        let query = raw.trim();
        if query.is_empty() {
            return Err(Error::Validation(EMPTY_QUERY_MESSAGE.to_string()));
        }
        Ok(Self {
            query: query.to_string(),
        })
    }
}

/// Reply from `/query`. Every field except `success` is optional and may
/// arrive as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub is_relevant: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub workflow_steps: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Shape used to dig an `error` field out of a non-2xx body, which may not
/// carry `success` or anything else.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Why a submission failed. Carries whatever the server said so the banner
/// can prefer it over the stage fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryFailure {
    #[error("server returned HTTP {status}")]
    Status { status: u16, error: Option<String> },

    #[error("server reported failure")]
    Rejected { error: Option<String> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl QueryFailure {
    /// Message for the error banner: server text if any, else the fallback
    /// for the stage that failed.
    pub fn user_message(&self) -> String {
        match self {
            QueryFailure::Status { error, .. } => non_empty(error.as_deref())
                .unwrap_or(FALLBACK_STATUS)
                .to_string(),
            QueryFailure::Rejected { error } => non_empty(error.as_deref())
                .unwrap_or(FALLBACK_REJECTED)
                .to_string(),
            QueryFailure::Transport(_) | QueryFailure::Decode(_) => {
                FALLBACK_UNEXPECTED.to_string()
            }
        }
    }
}

/// Classify a completed HTTP exchange.
///
/// The body is parsed first, whatever the status: a reply that is not JSON
/// is a decode failure even when the status is non-2xx. After that, non-2xx
/// wins over the body, so a 500 carrying `success: true` is still a failure.
/// A 2xx body must say `success: true`.
pub fn interpret(status: u16, body: &[u8]) -> std::result::Result<QueryResponse, QueryFailure> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| QueryFailure::Decode(e.to_string()))?;

    if !(200..300).contains(&status) {
        // A mistyped `error` field counts as absent
        let error = serde_json::from_value::<ErrorBody>(value)
            .ok()
            .and_then(|b| b.error);
        return Err(QueryFailure::Status { status, error });
    }

    let parsed: QueryResponse =
        serde_json::from_value(value).map_err(|e| QueryFailure::Decode(e.to_string()))?;

    if !parsed.success {
        return Err(QueryFailure::Rejected {
            error: parsed.error,
        });
    }

    Ok(parsed)
}

/// Empty strings count as absent, same as a missing field.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
