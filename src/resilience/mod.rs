//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to origin (metadata query or proxied request):
//!     → timeouts.rs (enforce deadline)
//!     → On timeout: metadata query → NotResolvable, proxy → 504
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: a failed download resolution already degrades to proxying

pub mod timeouts;
