//! Proxy fallback: forward a request to the origin unchanged.
//!
//! # Responsibilities
//! - Point the request URI at the origin, keeping path and query
//! - Forward method, headers and body; stream the response back
//! - Map transport failures to 502 / 504
//!
//! # Design Decisions
//! - Bodies stream in both directions, never buffered
//! - Hop-by-hop headers are stripped both ways
//! - The deadline covers the time to response headers only

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::{header, HeaderValue, Request, Response, Uri, Version};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::http::response::{bad_gateway, gateway_timeout, strip_hop_by_hop};
use crate::http::transport::{Transport, TransportError};
use crate::resilience::timeouts::with_deadline;

#[derive(Debug, Error)]
#[error("invalid origin URL '{0}'")]
pub struct InvalidOrigin(pub String);

/// Forwards requests to the origin through the shared transport.
#[derive(Clone)]
pub struct ProxyFallback {
    scheme: Scheme,
    authority: Authority,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl ProxyFallback {
    pub fn new(
        origin: &Url,
        transport: Arc<dyn Transport>,
        timeout: Duration,
    ) -> Result<Self, InvalidOrigin> {
        let invalid = || InvalidOrigin(origin.to_string());
        let scheme: Scheme = origin.scheme().parse().map_err(|_| invalid())?;
        let host = origin.host_str().ok_or_else(invalid)?;
        let authority = match origin.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority: Authority = authority.parse().map_err(|_| invalid())?;

        Ok(Self {
            scheme,
            authority,
            transport,
            timeout,
        })
    }

    /// The origin URI for an inbound request URI.
    pub fn target_uri(&self, uri: &Uri) -> Uri {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(self.scheme.clone());
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(axum::http::uri::PathAndQuery::from_static("/"));
        }
        Uri::from_parts(parts).unwrap_or_else(|_| uri.clone())
    }

    /// Forward `request` and return the origin's response, or a gateway error.
    pub async fn forward(&self, request: Request<Body>) -> Response<Body> {
        let (mut parts, body) = request.into_parts();
        let method = parts.method.clone();
        let path = parts.uri.path().to_string();

        parts.uri = self.target_uri(&parts.uri);
        // The origin leg is always HTTP/1.1, whatever the client spoke.
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);
        if let Some(host) = parts.headers.remove(header::HOST) {
            parts.headers.insert("x-forwarded-host", host);
        }
        if let Ok(host) = HeaderValue::from_str(self.authority.as_str()) {
            parts.headers.insert(header::HOST, host);
        }

        let outbound = Request::from_parts(parts, body);
        match with_deadline(self.timeout, self.transport.send(outbound)).await {
            Ok(response) => {
                let (mut parts, body) = response.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                Response::from_parts(parts, body)
            }
            Err(TransportError::Timeout(after)) => {
                tracing::warn!(method = %method, path = %path, timeout = ?after, "Upstream timed out");
                gateway_timeout()
            }
            Err(e) => {
                tracing::error!(method = %method, path = %path, error = %e, "Upstream error");
                bad_gateway()
            }
        }
    }
}
