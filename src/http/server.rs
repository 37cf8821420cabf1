//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (request ID, tracing)
//! - Classify every request and dispatch by category
//! - Resolve downloads and video streams, serve cache hits, proxy everything else
//! - Observability (metrics, correlation IDs)

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::cache::{CacheOutcome, CachePolicy, MemoryCacheStore};
use crate::config::GatewayConfig;
use crate::http::proxy::{InvalidOrigin, ProxyFallback};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::redirect_found;
use crate::http::transport::{HyperTransport, Transport};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::origin::OriginClient;
use crate::resolver::{DownloadOutcome, DownloadRequest, DownloadResolver};
use crate::routing::table::TableError;
use crate::routing::{RouteCategory, RouteClassifier};
use crate::strm::{default_hooks, HookSet, StrmRuleSet};

/// Errors while assembling the gateway from configuration.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("invalid URL in configuration: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Origin(#[from] InvalidOrigin),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<RouteClassifier>,
    pub resolver: DownloadResolver,
    pub cache: CachePolicy,
    pub proxy: ProxyFallback,
}

impl AppState {
    /// Assemble the gateway around an outbound transport and STRM hooks.
    pub fn new(
        config: &GatewayConfig,
        transport: Arc<dyn Transport>,
        hooks: HookSet,
    ) -> Result<Self, StartupError> {
        let classifier = Arc::new(RouteClassifier::new(config.backend)?);

        let origin_url = Url::parse(&config.origin.url)?;
        let origin = OriginClient::new(
            origin_url.clone(),
            Some(config.origin.api_key.clone()),
            transport.clone(),
            Duration::from_secs(config.timeouts.metadata_secs),
        );
        let resolver = DownloadResolver::new(origin, StrmRuleSet::from_config(&config.strm), hooks);

        let store = Arc::new(MemoryCacheStore::new(
            Duration::from_secs(config.cache.ttl_secs),
            config.cache.max_entries,
        ));
        let cache = CachePolicy::new(store, &config.cache);

        let proxy = ProxyFallback::new(
            &origin_url,
            transport,
            Duration::from_secs(config.timeouts.request_secs),
        )?;

        Ok(Self {
            classifier,
            resolver,
            cache,
            proxy,
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server talking to the origin over the pooled hyper client.
    pub fn new(config: &GatewayConfig) -> Result<Self, StartupError> {
        let transport = Arc::new(HyperTransport::new(Duration::from_secs(
            config.timeouts.connect_secs,
        )));
        let hooks = default_hooks(config)?;
        let state = AppState::new(config, transport, hooks)?;
        Ok(Self::from_state(state))
    }

    /// Create a server from prepared state (custom transport or hooks).
    pub fn from_state(state: AppState) -> Self {
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve on `listener` until `shutdown` triggers.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.state.classifier.backend(),
            "Gateway listening"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

/// Main gateway handler.
/// Classifies the request, then redirects, serves from cache, or proxies.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let category = state.classifier.classify(&method, &path);
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        category = %category,
        "Dispatching request"
    );

    let response = match category {
        RouteCategory::Download => {
            let download = DownloadRequest::from_request(&request);
            handle_redirect(&state, download, request).await
        }
        RouteCategory::VideoStream => {
            let stream = DownloadRequest::from_stream_request(&request);
            handle_redirect(&state, stream, request).await
        }
        RouteCategory::ImageCache | RouteCategory::SubtitleCache => {
            handle_cached(&state, category, request).await
        }
        _ => state.proxy.forward(request).await,
    };

    metrics::record_request(category.as_str(), response.status().as_u16(), start_time);
    response
}

/// Redirect a download or stream request for a STRM item, proxy anything else.
async fn handle_redirect(
    state: &AppState,
    download: Option<DownloadRequest>,
    request: Request<Body>,
) -> Response<Body> {
    let Some(download) = download else {
        return state.proxy.forward(request).await;
    };

    match state.resolver.resolve(&download).await {
        DownloadOutcome::Redirect(redirect) => redirect_found(&redirect.target_url),
        DownloadOutcome::NotResolvable => state.proxy.forward(request).await,
    }
}

async fn handle_cached(
    state: &AppState,
    category: RouteCategory,
    request: Request<Body>,
) -> Response<Body> {
    match state.cache.apply(category, &request) {
        CacheOutcome::Hit(response) => response,
        CacheOutcome::Miss(key) => {
            let response = state.proxy.forward(request).await;
            state.cache.capture(key, response).await
        }
        CacheOutcome::Bypass => state.proxy.forward(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrmRuleConfig;
    use crate::http::transport::FnTransport;
    use crate::strm::StrmKind;
    use axum::http::{header, Method, StatusCode};
    use tower::ServiceExt;

    const ITEMS: &str = r#"{"Items":[{"Path":"/strm/http/movie.strm","MediaSources":[{"Id":"mediasource_1","Protocol":"Http","Path":"https://origin.example/first.mp4"},{"Id":"mediasource_2","Protocol":"Http","Path":"https://origin.example/second.mp4"}]}]}"#;

    fn server() -> HttpServer {
        let mut config = GatewayConfig::default();
        config.origin.url = "http://emby.test".into();
        config.strm.rules.push(StrmRuleConfig {
            prefix: "/strm/http/".into(),
            kind: StrmKind::HttpStrm,
            enabled: true,
        });

        let transport = FnTransport::new(|req| {
            let body = if req.uri().path() == "/Items" { ITEMS } else { "proxied" };
            Ok(Response::builder()
                .header("x-gateway-test", "proxy")
                .header(header::CONTENT_LENGTH, body.len())
                .body(Body::from(body))
                .unwrap())
        });
        let hooks = HookSet::new()
            .with_hook(StrmKind::HttpStrm, |content, _| format!("{}#redirected", content));
        let state = AppState::new(&config, Arc::new(transport), hooks).unwrap();
        HttpServer::from_state(state)
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_download_redirects() {
        let res = server()
            .router()
            .oneshot(request(
                Method::GET,
                "/emby/Items/18464/Download?api_key=test&mediasourceid=mediasource_2",
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers()[header::LOCATION],
            "https://origin.example/second.mp4#redirected"
        );
        assert!(res.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_video_stream_redirects() {
        let res = server()
            .router()
            .oneshot(request(
                Method::GET,
                "/emby/Videos/18464/stream.mkv?Static=true&MediaSourceId=mediasource_2",
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers()[header::LOCATION],
            "https://origin.example/second.mp4#redirected"
        );
    }

    #[tokio::test]
    async fn test_head_download_is_proxied() {
        let res = server()
            .router()
            .oneshot(request(Method::HEAD, "/emby/Items/18464/Download"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["x-gateway-test"], "proxy");
    }

    #[tokio::test]
    async fn test_unclassified_is_proxied() {
        let res = server()
            .router()
            .oneshot(request(Method::GET, "/System/Info"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"proxied");
    }

    #[tokio::test]
    async fn test_image_is_cached() {
        let server = server();
        let res = server
            .router()
            .oneshot(request(Method::GET, "/emby/Items/6/Images/Primary?maxWidth=300"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(server.state().cache.store().len(), 1);
    }
}
