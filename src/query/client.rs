//! HTTP client for the `/query` endpoint.

use std::time::Duration;

use crate::{qlog_debug, qlog_warn, Error, Result};

use super::{interpret, QueryFailure, QueryRequest, QueryResponse};

const QUERY_PATH: &str = "/query";

/// Posts queries to a backend. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct QueryClient {
    client: reqwest::Client,
    url: String,
}

impl QueryClient {
    /// `endpoint` is the backend base URL, e.g. `http://127.0.0.1:5009`.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let base = endpoint.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(Error::InvalidEndpoint(endpoint.to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: format!("{base}{QUERY_PATH}"),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request and classify the reply.
    pub async fn submit(
        &self,
        request: &QueryRequest,
    ) -> std::result::Result<QueryResponse, QueryFailure> {
        qlog_debug!(
            "QueryClient::submit url={} len={}",
            self.url,
            request.query.len()
        );

        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                qlog_warn!("QueryClient transport failure: {}", e);
                QueryFailure::Transport(e.to_string())
            })?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(|e| {
            qlog_warn!("QueryClient body read failure: status={} err={}", status, e);
            QueryFailure::Transport(e.to_string())
        })?;

        qlog_debug!("QueryClient reply status={} bytes={}", status, body.len());
        interpret(status, &body)
    }
}
