//! Origin media-server access.

pub mod client;
pub mod types;

pub use client::{OriginClient, OriginError};
pub use types::{MediaItem, MediaProtocol, MediaSource};
