//! Per-backend pattern tables.
//!
//! Each table lists its rules in evaluation order. Adding a backend means adding a
//! constructor here; `PatternTable::classify` stays the same for every variant.

use axum::http::Method;
use thiserror::Error;

use crate::routing::category::{BackendVariant, RouteCategory};
use crate::routing::matcher::{CaseMode, PatternRule};

use CaseMode::{Insensitive, Sensitive};
use RouteCategory::*;

/// A rule that failed to compile.
#[derive(Debug, Error)]
#[error("invalid {category} pattern for {backend}: {source}")]
pub struct TableError {
    pub backend: BackendVariant,
    pub category: RouteCategory,
    #[source]
    pub source: regex::Error,
}

/// Rule declaration: category, pattern source, case mode, GET-only.
type RuleSpec = (RouteCategory, &'static str, CaseMode, bool);

// /emby/Items/6/Images/Primary
// /emby/Items/123/Images/Chapter/0
const EMBY_RULES: &[RuleSpec] = &[
    (VideoStream, r"^(/emby)?/Videos/\d+/(stream|original)(\.\w+)?$", Insensitive, false),
    (Download, r"^(/emby)?/Items/\d+/Download$", Insensitive, false),
    (WebAsset, r"^/web/modules/htmlvideoplayer/basehtmlplayer.js$", Insensitive, false),
    (WebIndex, r"^/web/index.html$", Sensitive, false),
    (PlaybackInfo, r"^(/emby)?/Items/\d+/PlaybackInfo$", Insensitive, false),
    (SubtitleRewrite, r"^(/emby)?/Videos/\d+/\w+/subtitles$", Insensitive, false),
    (ImageCache, r"^(/emby)?/Items/\d+/Images(/.*)?$", Insensitive, true),
    (SubtitleCache, r"/Videos/(.*)/Subtitles/(.*)/Stream\.(ass|ssa|srt|)?$", Insensitive, true),
    // /emby/videos/{id}/stream/{file}, the non-canonical stream form
    (VideoStream, r"^(/emby)?/videos/(.*)/stream/(.*)", Insensitive, false),
];

// /Videos/813a630bcf9c3f693a2ec8c498f868d2/stream.mp4
// /Videos/6c252d46-952c-5b0d-5f0e-f6e3036c0a39/6c252d46952c5b0d5f0ef6e3036c0a39/Subtitles/2/0/Stream.ass
const JELLYFIN_RULES: &[RuleSpec] = &[
    (VideoStream, r"/Videos/[\w-]+/(stream|original)(\.\w+)?$", Insensitive, false),
    (Download, r"^/Items/\w+/Download$", Insensitive, false),
    (WebIndex, r"^/web/$", Sensitive, false),
    (PlaybackInfo, r"^/Items/\w+/PlaybackInfo$", Insensitive, false),
    (SubtitleRewrite, r"/Videos/\d+/\w+/subtitles$", Insensitive, false),
    (ImageCache, r"/Items/\w+/Images(/.*)?$", Insensitive, true),
    (SubtitleCache, r"/Videos/(.*)/Subtitles/(.*)/Stream\.(ass|ssa|srt|)?$", Insensitive, true),
];

const FNTV_RULES: &[RuleSpec] = &[
    (VideoStream, r"^/v/api/v1/stream$", Insensitive, false),
    (ImageCache, r"^/v/api/v1/sys/img/[\d\w]{2}/[\d\w]{2}/[\d\w]+\.[\d\w]+$", Insensitive, true),
    (SubtitleCache, r"^/v/api/v1/subtitle/dl/[\d\w]+$", Insensitive, true),
];

/// Ordered, compiled rules for one backend variant.
#[derive(Debug)]
pub struct PatternTable {
    backend: BackendVariant,
    rules: Vec<PatternRule>,
}

impl PatternTable {
    /// Build from already compiled rules. Declaration order is evaluation order.
    pub fn new(backend: BackendVariant, rules: Vec<PatternRule>) -> Self {
        Self { backend, rules }
    }

    /// Compile the built-in table for `backend`.
    pub fn for_backend(backend: BackendVariant) -> Result<Self, TableError> {
        let specs = match backend {
            BackendVariant::Emby => EMBY_RULES,
            BackendVariant::Jellyfin => JELLYFIN_RULES,
            BackendVariant::Fntv => FNTV_RULES,
        };

        let rules = specs
            .iter()
            .map(|&(category, pattern, case, get_only)| {
                let compiled = if get_only {
                    PatternRule::with_methods(category, pattern, case, vec![Method::GET])
                } else {
                    PatternRule::new(category, pattern, case)
                };
                compiled.map_err(|source| TableError {
                    backend,
                    category,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(backend, rules))
    }

    pub fn backend(&self) -> BackendVariant {
        self.backend
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// First matching category, or `Unclassified`.
    pub fn classify(&self, method: &Method, path: &str) -> RouteCategory {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(PatternRule::category)
            .unwrap_or(Unclassified)
    }
}
