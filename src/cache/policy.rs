//! Cache policy for image and subtitle routes.
//!
//! # Responsibilities
//! - Derive a cache key from the normalized path and relevant query params
//! - Serve hits straight from the store
//! - Capture cacheable origin responses on a miss
//!
//! # Design Decisions
//! - Keys ignore auth/session parameters so every client shares entries
//! - Only `200 OK` with a known, bounded `Content-Length` is captured
//! - Anything else streams through untouched

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode, Uri};
use std::sync::Arc;

use crate::cache::store::{CacheStore, CachedResponse};
use crate::config::CacheConfig;
use crate::http::response::{bad_gateway, strip_hop_by_hop};
use crate::observability::metrics;
use crate::routing::RouteCategory;

/// Image query parameters that change the rendered bytes.
const IMAGE_KEY_PARAMS: &[&str] = &[
    "maxwidth",
    "maxheight",
    "width",
    "height",
    "quality",
    "tag",
    "format",
    "fillwidth",
    "fillheight",
    "cropwhitespace",
    "blur",
    "index",
];

/// Result of consulting the cache.
#[derive(Debug)]
pub enum CacheOutcome {
    /// Stored response, ready to send.
    Hit(Response<Body>),
    /// Not stored; proxy and hand the response to [`CachePolicy::capture`].
    Miss(String),
    /// Caching is off for this category.
    Bypass,
}

/// Decides when cached responses are served and stored.
#[derive(Clone)]
pub struct CachePolicy {
    store: Arc<dyn CacheStore>,
    image: bool,
    subtitle: bool,
    max_entry_bytes: usize,
}

impl CachePolicy {
    pub fn new(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            image: config.image,
            subtitle: config.subtitle,
            max_entry_bytes: config.max_entry_bytes,
        }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn image_enabled(&self) -> bool {
        self.image
    }

    pub fn subtitle_enabled(&self) -> bool {
        self.subtitle
    }

    fn enabled_for(&self, category: RouteCategory) -> bool {
        match category {
            RouteCategory::ImageCache => self.image,
            RouteCategory::SubtitleCache => self.subtitle,
            _ => false,
        }
    }

    /// Look the request up in the store.
    pub fn apply(&self, category: RouteCategory, request: &Request<Body>) -> CacheOutcome {
        if !self.enabled_for(category) {
            return CacheOutcome::Bypass;
        }
        let Some(key) = cache_key(category, request.uri()) else {
            return CacheOutcome::Bypass;
        };
        let kind = kind_label(category);

        match self.store.get(&key) {
            Some(cached) => {
                tracing::debug!(key = %key, "Cache hit");
                metrics::record_cache_lookup(kind, "hit");
                CacheOutcome::Hit(cached.into_response())
            }
            None => {
                metrics::record_cache_lookup(kind, "miss");
                CacheOutcome::Miss(key)
            }
        }
    }

    /// Store `response` under `key` if it is cacheable, and return it for sending.
    pub async fn capture(&self, key: String, response: Response<Body>) -> Response<Body> {
        if response.status() != StatusCode::OK {
            return response;
        }
        let length = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        match length {
            Some(len) if len <= self.max_entry_bytes => {}
            _ => return response,
        }

        let (mut parts, body) = response.into_parts();
        let bytes = match axum::body::to_bytes(body, self.max_entry_bytes).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read cacheable origin body");
                return bad_gateway();
            }
        };

        strip_hop_by_hop(&mut parts.headers);
        self.store.put(
            key.clone(),
            CachedResponse {
                status: parts.status,
                headers: parts.headers.clone(),
                body: bytes.clone(),
            },
        );
        tracing::debug!(key = %key, bytes = bytes.len(), "Cached origin response");

        Response::from_parts(parts, Body::from(bytes))
    }
}

fn kind_label(category: RouteCategory) -> &'static str {
    match category {
        RouteCategory::ImageCache => "image",
        _ => "subtitle",
    }
}

/// Cache key for a request, or `None` for non-cache categories.
pub fn cache_key(category: RouteCategory, uri: &Uri) -> Option<String> {
    let path = uri.path().to_ascii_lowercase();
    match category {
        RouteCategory::ImageCache => {
            let mut params: Vec<(String, String)> = uri
                .query()
                .map(|q| {
                    url::form_urlencoded::parse(q.as_bytes())
                        .map(|(k, v)| (k.to_ascii_lowercase(), v.into_owned()))
                        .filter(|(k, _)| IMAGE_KEY_PARAMS.contains(&k.as_str()))
                        .collect()
                })
                .unwrap_or_default();
            params.sort();

            let mut key = format!("img:{}", path);
            if !params.is_empty() {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(params)
                    .finish();
                key.push('?');
                key.push_str(&query);
            }
            Some(key)
        }
        RouteCategory::SubtitleCache => Some(format!("sub:{}", path)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::MemoryCacheStore;
    use std::time::Duration;

    fn policy(config: CacheConfig) -> CachePolicy {
        let store = Arc::new(MemoryCacheStore::new(Duration::from_secs(60), 16));
        CachePolicy::new(store, &config)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn origin_response(body: &'static str) -> Response<Body> {
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "image/jpeg")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_image_key_ignores_auth_params() {
        let a: Uri = "/emby/Items/6/Images/Primary?maxWidth=300&api_key=x&quality=90".parse().unwrap();
        let b: Uri = "/EMBY/items/6/images/primary?quality=90&X-Emby-Token=y&MaxWidth=300".parse().unwrap();
        assert_eq!(cache_key(RouteCategory::ImageCache, &a), cache_key(RouteCategory::ImageCache, &b));
        assert_eq!(
            cache_key(RouteCategory::ImageCache, &a).unwrap(),
            "img:/emby/items/6/images/primary?maxwidth=300&quality=90"
        );

        let c: Uri = "/emby/Items/6/Images/Primary?maxWidth=600".parse().unwrap();
        assert_ne!(cache_key(RouteCategory::ImageCache, &a), cache_key(RouteCategory::ImageCache, &c));
    }

    #[test]
    fn test_subtitle_key_ignores_query() {
        let a: Uri = "/Videos/1/x/Subtitles/2/Stream.srt?api_key=a".parse().unwrap();
        assert_eq!(
            cache_key(RouteCategory::SubtitleCache, &a).unwrap(),
            "sub:/videos/1/x/subtitles/2/stream.srt"
        );
        assert!(cache_key(RouteCategory::Download, &a).is_none());
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let policy = policy(CacheConfig::default());
        let req = get("/Items/6/Images/Primary");

        let key = match policy.apply(RouteCategory::ImageCache, &req) {
            CacheOutcome::Miss(key) => key,
            other => panic!("expected miss, got {:?}", other),
        };
        let sent = policy.capture(key, origin_response("jpeg-bytes")).await;
        let sent_body = axum::body::to_bytes(sent.into_body(), 1024).await.unwrap();
        assert_eq!(&sent_body[..], b"jpeg-bytes");

        match policy.apply(RouteCategory::ImageCache, &req) {
            CacheOutcome::Hit(res) => {
                assert_eq!(res.headers()[header::CONTENT_TYPE], "image/jpeg");
                let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
                assert_eq!(&body[..], b"jpeg-bytes");
            }
            other => panic!("expected hit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_uncacheable_responses_pass_through() {
        let policy = policy(CacheConfig {
            max_entry_bytes: 4,
            ..CacheConfig::default()
        });

        let too_big = policy.capture("k".into(), origin_response("0123456789")).await;
        assert_eq!(too_big.status(), StatusCode::OK);

        let not_found = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty())
            .unwrap();
        policy.capture("k".into(), not_found).await;

        let no_length = Response::new(Body::from("abc"));
        policy.capture("k".into(), no_length).await;

        assert!(policy.store().is_empty());
    }

    #[test]
    fn test_disabled_category_bypasses() {
        let policy = policy(CacheConfig {
            subtitle: false,
            ..CacheConfig::default()
        });
        let req = get("/Videos/1/x/Subtitles/2/Stream.srt");
        assert!(matches!(policy.apply(RouteCategory::SubtitleCache, &req), CacheOutcome::Bypass));
        assert!(matches!(policy.apply(RouteCategory::VideoStream, &req), CacheOutcome::Bypass));
    }
}
