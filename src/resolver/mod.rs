//! Request resolvers.
//!
//! # Data Flow
//! ```text
//! Download request
//!     → download.rs (method check, metadata query, STRM rule, source pick, hook)
//!     → Redirect(target) | NotResolvable
//! ```

pub mod download;

pub use download::{
    DownloadOutcome, DownloadRequest, DownloadResolver, RedirectResult, Unresolvable,
};
