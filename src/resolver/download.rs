//! Download and stream redirect resolution.
//!
//! # Responsibilities
//! - Decide whether a download targets a STRM pointer file
//! - Pick the requested media source and produce a redirect target
//! - Collapse every failure into `NotResolvable`
//!
//! # Design Decisions
//! - Exactly one metadata query per request; nothing is cached between requests
//! - Failure reasons are typed for logs and metrics but never reach the client
//! - Only GET is resolved; HEAD and the rest always proxy

use axum::body::Body;
use axum::http::{header, Method, Request};
use thiserror::Error;

use crate::observability::metrics;
use crate::origin::{OriginClient, OriginError};
use crate::routing::{item_id_from_path, video_item_id_from_path};
use crate::strm::{HookContext, HookSet, StrmRuleSet};

/// Query parameter naming the requested media source (matched case-insensitively).
pub const MEDIA_SOURCE_ID_PARAM: &str = "mediasourceid";

/// The parts of a download request the resolver looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub method: Method,
    pub item_id: String,
    pub media_source_id: Option<String>,
    pub user_agent: Option<String>,
}

impl DownloadRequest {
    /// Extract from an incoming download request. `None` when the path carries no item id.
    pub fn from_request(request: &Request<Body>) -> Option<Self> {
        let item_id = item_id_from_path(request.uri().path())?;
        Some(Self::for_item(request, item_id))
    }

    /// Extract from a video stream request (`/Videos/{id}/stream`).
    pub fn from_stream_request(request: &Request<Body>) -> Option<Self> {
        let item_id = video_item_id_from_path(request.uri().path())?;
        Some(Self::for_item(request, item_id))
    }

    fn for_item(request: &Request<Body>, item_id: &str) -> Self {
        let item_id = item_id.to_string();

        let media_source_id = request.uri().query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key.eq_ignore_ascii_case(MEDIA_SOURCE_ID_PARAM))
                .map(|(_, value)| value.into_owned())
                .filter(|value| !value.is_empty())
        });

        let user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Self {
            method: request.method().clone(),
            item_id,
            media_source_id,
            user_agent,
        }
    }
}

/// A resolved redirect target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResult {
    pub target_url: String,
    /// True when a post-processing hook rewrote the target.
    pub postprocessed: bool,
}

/// What the caller should do with a download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Answer `302 Found` with `Location: target_url`.
    Redirect(RedirectResult),
    /// Proxy the request unchanged.
    NotResolvable,
}

/// Why a download could not be resolved.
#[derive(Debug, Error)]
pub enum Unresolvable {
    #[error("method {0} is never redirected")]
    Method(Method),

    #[error("metadata query failed: {0}")]
    Origin(#[from] OriginError),

    #[error("origin returned no items")]
    NoItems,

    #[error("item has no path")]
    EmptyItemPath,

    #[error("item path '{0}' matches no enabled STRM rule")]
    NotStrm(String),

    #[error("item has no media sources")]
    NoMediaSources,

    #[error("selected media source has no path")]
    EmptySourcePath,
}

impl Unresolvable {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Unresolvable::Method(_) => "method",
            Unresolvable::Origin(_) => "origin_error",
            Unresolvable::NoItems => "no_items",
            Unresolvable::EmptyItemPath => "empty_item_path",
            Unresolvable::NotStrm(_) => "not_strm",
            Unresolvable::NoMediaSources => "no_media_sources",
            Unresolvable::EmptySourcePath => "empty_source_path",
        }
    }
}

/// Resolves download requests for STRM items into redirects.
#[derive(Clone)]
pub struct DownloadResolver {
    origin: OriginClient,
    rules: StrmRuleSet,
    hooks: HookSet,
}

impl DownloadResolver {
    pub fn new(origin: OriginClient, rules: StrmRuleSet, hooks: HookSet) -> Self {
        Self {
            origin,
            rules,
            hooks,
        }
    }

    pub fn rules(&self) -> &StrmRuleSet {
        &self.rules
    }

    /// Resolve a download. Never fails; anything unexpected is `NotResolvable`.
    pub async fn resolve(&self, request: &DownloadRequest) -> DownloadOutcome {
        match self.try_resolve(request).await {
            Ok(redirect) => {
                tracing::info!(
                    item_id = %request.item_id,
                    target = %redirect.target_url,
                    postprocessed = redirect.postprocessed,
                    "Download resolved to redirect"
                );
                metrics::record_download_resolution("redirect");
                DownloadOutcome::Redirect(redirect)
            }
            Err(reason) => {
                tracing::debug!(
                    item_id = %request.item_id,
                    reason = %reason,
                    "Download not resolvable, falling back to proxy"
                );
                metrics::record_download_resolution(reason.label());
                DownloadOutcome::NotResolvable
            }
        }
    }

    /// Resolution with the failure reason kept.
    pub async fn try_resolve(
        &self,
        request: &DownloadRequest,
    ) -> Result<RedirectResult, Unresolvable> {
        if request.method != Method::GET {
            return Err(Unresolvable::Method(request.method.clone()));
        }

        let items = self.origin.query_items(&request.item_id).await?;
        let item = items.first().ok_or(Unresolvable::NoItems)?;
        if item.path.is_empty() {
            return Err(Unresolvable::EmptyItemPath);
        }

        let rule = self
            .rules
            .match_path(&item.path)
            .ok_or_else(|| Unresolvable::NotStrm(item.path.clone()))?;

        let source = item
            .select_source(request.media_source_id.as_deref())
            .ok_or(Unresolvable::NoMediaSources)?;
        if source.path.is_empty() {
            return Err(Unresolvable::EmptySourcePath);
        }

        let ctx = HookContext {
            kind: rule.kind,
            item_id: request.item_id.clone(),
            user_agent: request.user_agent.clone(),
        };

        Ok(match self.hooks.apply(&source.path, &ctx) {
            Some(target_url) => RedirectResult {
                target_url,
                postprocessed: true,
            },
            None => RedirectResult {
                target_url: source.path.clone(),
                postprocessed: false,
            },
        })
    }
}
