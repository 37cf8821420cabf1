//! Admin API served on a separate listener.
//!
//! Every route requires `Authorization: Bearer {admin.api_key}`.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::cache::CachePolicy;
use crate::http::server::AppState;
use crate::routing::RouteClassifier;

use self::auth::admin_auth_middleware;
use self::handlers::{get_cache, get_classify, get_status};

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub classifier: Arc<RouteClassifier>,
    pub cache: CachePolicy,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(gateway: &AppState, api_key: &str) -> Self {
        Self {
            classifier: gateway.classifier.clone(),
            cache: gateway.cache.clone(),
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/cache", get(get_cache))
        .route("/admin/classify", get(get_classify))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .with_state(state)
}
