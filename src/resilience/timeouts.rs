//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap outbound calls with a deadline
//! - Cancel operations cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out proxy requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use crate::http::transport::TransportError;

/// Run `fut`, failing with [`TransportError::Timeout`] after `deadline`.
///
/// The inner future is dropped on timeout, which cancels the outbound request.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(deadline)),
    }
}
