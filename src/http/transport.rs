//! Outbound HTTP transport.
//!
//! # Responsibilities
//! - Send a request to the origin and hand back a streaming response
//! - Shared by the metadata query and the proxy fallback
//!
//! # Design Decisions
//! - Trait object injected at construction so tests can substitute a fake
//! - Dropping the returned future cancels the outbound request
//! - Response bodies are never buffered here

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;
use thiserror::Error;

/// Errors from an outbound request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection or protocol failure talking to the origin.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// No response within the deadline.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),
}

/// Future returned by [`Transport::send`].
pub type TransportFuture = BoxFuture<'static, Result<Response<Body>, TransportError>>;

/// A swappable request/response capability.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request<Body>) -> TransportFuture;
}

/// Transport backed by the pooled hyper client.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
}

impl HyperTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }
}

impl Transport for HyperTransport {
    fn send(&self, request: Request<Body>) -> TransportFuture {
        let client = self.client.clone();
        Box::pin(async move {
            let response: Response<Incoming> = client
                .request(request)
                .await
                .map_err(|e| TransportError::Upstream(e.to_string()))?;
            let (parts, body) = response.into_parts();
            Ok(Response::from_parts(parts, Body::new(body)))
        })
    }
}

/// Transport answering every request with a closure. Handy in tests.
pub struct FnTransport<F> {
    handler: F,
}

impl<F> FnTransport<F>
where
    F: Fn(Request<Body>) -> Result<Response<Body>, TransportError> + Send + Sync + 'static,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> Transport for FnTransport<F>
where
    F: Fn(Request<Body>) -> Result<Response<Body>, TransportError> + Send + Sync + 'static,
{
    fn send(&self, request: Request<Body>) -> TransportFuture {
        let result = (self.handler)(request);
        Box::pin(async move { result })
    }
}
