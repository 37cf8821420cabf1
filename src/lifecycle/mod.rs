//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Trigger → every listener stops accepting → in-flight requests drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup in main: config, logging, metrics, listeners last
//! - One shutdown flag shared by the gateway and admin listeners

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
