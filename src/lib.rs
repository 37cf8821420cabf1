//! Media streaming gateway library.
//!
//! Sits between clients and an Emby, Jellyfin or FNTV media server:
//! downloads of remotely hosted STRM items become redirects, images and
//! subtitles are cached, and everything else is proxied to the origin.

pub mod admin;
pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod origin;
pub mod resilience;
pub mod resolver;
pub mod routing;
pub mod strm;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{BackendVariant, RouteCategory, RouteClassifier};
