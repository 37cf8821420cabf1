//! Route classification.
//!
//! # Responsibilities
//! - Hold the compiled pattern table for the active backend
//! - Classify (method, path) into a route category
//! - Extract path parameters the handlers need (item id for downloads and streams)
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over the backend's rules, first match wins
//! - Explicit `Unclassified` rather than an error

use axum::http::Method;

use crate::routing::category::{BackendVariant, RouteCategory};
use crate::routing::table::{PatternTable, TableError};

/// Classifies requests for one backend variant.
#[derive(Debug)]
pub struct RouteClassifier {
    table: PatternTable,
}

impl RouteClassifier {
    /// Compile the table for `backend`.
    pub fn new(backend: BackendVariant) -> Result<Self, TableError> {
        let table = PatternTable::for_backend(backend)?;
        tracing::debug!(backend = %backend, rules = table.rules().len(), "Pattern table compiled");
        Ok(Self { table })
    }

    /// Wrap an existing table.
    pub fn from_table(table: PatternTable) -> Self {
        Self { table }
    }

    pub fn backend(&self) -> BackendVariant {
        self.table.backend()
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Classify a request. Pure; the same input always yields the same category.
    pub fn classify(&self, method: &Method, path: &str) -> RouteCategory {
        let category = self.table.classify(method, path);
        tracing::trace!(backend = %self.backend(), method = %method, path = %path, category = %category, "Classified");
        category
    }
}

/// Item id from an `.../Items/{id}/...` path, matching `Items` case-insensitively.
pub fn item_id_from_path(path: &str) -> Option<&str> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    segments
        .by_ref()
        .find(|s| s.eq_ignore_ascii_case("items"))?;
    segments.next()
}

/// Item id from a video stream path, `{prefix}/Videos/{id}/stream...` or `.../original...`.
///
/// Accepts the optional `/emby` mount prefix, any casing, a container extension
/// (`stream.mp4`) and the `/videos/{id}/stream/{file}` form some clients send.
pub fn video_item_id_from_path(path: &str) -> Option<&str> {
    let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
    if segments
        .peek()
        .is_some_and(|s| s.eq_ignore_ascii_case("emby"))
    {
        segments.next();
    }
    if !segments.next()?.eq_ignore_ascii_case("videos") {
        return None;
    }
    let id = segments.next()?;
    let kind = segments.next()?.to_ascii_lowercase();
    let is_stream = ["stream", "original"]
        .iter()
        .any(|k| kind == *k || kind.starts_with(&format!("{}.", k)));
    is_stream.then_some(id)
}
