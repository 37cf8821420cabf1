//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway handler, resolver, cache policy
//!     → logging.rs (tracing events carrying request_id, item_id, category)
//!     → metrics.rs (request counts by category, resolution outcomes, cache hits)
//!
//! Consumers:
//!     → stdout (pretty for development, JSON for log shippers)
//!     → Prometheus scrape on `observability.metrics_address`
//! ```

pub mod logging;
pub mod metrics;
