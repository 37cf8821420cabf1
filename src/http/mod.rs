//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, classification)
//!     → [resolver | cache | proxy.rs]
//!     → transport.rs (outbound call to the origin)
//!     → response.rs (redirects, gateway errors, header hygiene)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;
pub mod transport;

pub use proxy::ProxyFallback;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, StartupError};
pub use transport::{FnTransport, HyperTransport, Transport, TransportError};
