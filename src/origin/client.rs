//! Metadata queries against the origin media server.
//!
//! # Responsibilities
//! - Build the `/Items` query for an item id
//! - Send it through the shared transport under a deadline
//! - Decode the response into `MediaItem`s
//!
//! # Design Decisions
//! - One request per call, no caching or coalescing
//! - Any failure is returned as a typed error; callers decide how to degrade

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode, Uri};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::http::transport::{Transport, TransportError};
use crate::origin::types::{ItemsResponse, MediaItem};
use crate::resilience::timeouts::with_deadline;

/// Largest metadata body the gateway will read.
const MAX_METADATA_BYTES: usize = 4 * 1024 * 1024;

const USER_AGENT: &str = concat!("media-gateway/", env!("CARGO_PKG_VERSION"));

/// Errors from a metadata query.
#[derive(Debug, Error)]
pub enum OriginError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("origin returned {0}")]
    Status(StatusCode),

    #[error("failed to read origin body: {0}")]
    Body(String),

    #[error("malformed origin response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid origin URL: {0}")]
    Url(String),
}

/// Client for the origin's item metadata endpoint.
#[derive(Clone)]
pub struct OriginClient {
    base: Url,
    api_key: Option<String>,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl OriginClient {
    pub fn new(
        base: Url,
        api_key: Option<String>,
        transport: Arc<dyn Transport>,
        timeout: Duration,
    ) -> Self {
        Self {
            base,
            api_key: api_key.filter(|k| !k.is_empty()),
            transport,
            timeout,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URI of the metadata query for `item_id`.
    pub fn items_uri(&self, item_id: &str) -> Result<Uri, OriginError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| OriginError::Url(self.base.to_string()))?
            .pop_if_empty()
            .push("Items");
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("Ids", item_id)
                .append_pair("Fields", "Path,MediaSources")
                .append_pair("Limit", "1");
            if let Some(key) = &self.api_key {
                query.append_pair("api_key", key);
            }
        }
        url.as_str()
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| OriginError::Url(e.to_string()))
    }

    /// Fetch metadata for one item. Zero items is a successful, empty result.
    pub async fn query_items(&self, item_id: &str) -> Result<Vec<MediaItem>, OriginError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(self.items_uri(item_id)?)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
            .map_err(|e| OriginError::Url(e.to_string()))?;

        let response = with_deadline(self.timeout, self.transport.send(request)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OriginError::Status(status));
        }

        let body = with_deadline(self.timeout, async {
            axum::body::to_bytes(response.into_body(), MAX_METADATA_BYTES)
                .await
                .map_err(|e| TransportError::Upstream(e.to_string()))
        })
        .await
        .map_err(|e| OriginError::Body(e.to_string()))?;

        let parsed: ItemsResponse = serde_json::from_slice(&body)?;
        Ok(parsed.items)
    }
}
