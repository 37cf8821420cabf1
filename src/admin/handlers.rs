use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AdminState;
use crate::routing::RouteCategory;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub backend: &'static str,
}

#[derive(Serialize)]
pub struct CacheSummary {
    pub entries: usize,
    pub image_enabled: bool,
    pub subtitle_enabled: bool,
}

#[derive(Deserialize)]
pub struct ClassifyQuery {
    #[serde(default)]
    pub method: Option<String>,
    pub path: String,
}

#[derive(Serialize)]
pub struct Classification {
    pub category: RouteCategory,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        backend: state.classifier.backend().as_str(),
    })
}

pub async fn get_cache(State(state): State<AdminState>) -> Json<CacheSummary> {
    Json(CacheSummary {
        entries: state.cache.store().len(),
        image_enabled: state.cache.image_enabled(),
        subtitle_enabled: state.cache.subtitle_enabled(),
    })
}

pub async fn get_classify(
    State(state): State<AdminState>,
    Query(query): Query<ClassifyQuery>,
) -> Result<Json<Classification>, StatusCode> {
    let method = match query.method.as_deref() {
        Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
            .map_err(|_| StatusCode::BAD_REQUEST)?,
        None => Method::GET,
    };

    Ok(Json(Classification {
        category: state.classifier.classify(&method, &query.path),
    }))
}

#[cfg(test)]
mod tests {
    use super::super::{setup_admin_router, AdminState};
    use crate::config::GatewayConfig;
    use crate::http::server::AppState;
    use crate::http::transport::FnTransport;
    use crate::strm::HookSet;
    use axum::body::Body;
    use axum::http::{header, Request, Response, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn admin() -> axum::Router {
        let transport = FnTransport::new(|_| Ok(Response::new(Body::empty())));
        let gateway =
            AppState::new(&GatewayConfig::default(), Arc::new(transport), HookSet::new()).unwrap();
        setup_admin_router(AdminState::new(&gateway, "secret"))
    }

    async fn get(uri: &str, key: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut req = Request::builder().uri(uri);
        if let Some(key) = key {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", key));
        }
        let res = admin().oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), 4096).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_requires_bearer_key() {
        assert_eq!(get("/admin/status", None).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(get("/admin/status", Some("wrong")).await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_status() {
        let (status, json) = get("/admin/status", Some("secret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["backend"], "emby");
        assert_eq!(json["status"], "operational");
    }

    #[tokio::test]
    async fn test_cache_summary() {
        let (status, json) = get("/admin/cache", Some("secret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["entries"], 0);
    }

    #[tokio::test]
    async fn test_classify() {
        let (_, json) = get(
            "/admin/classify?method=get&path=/emby/Items/1/Download",
            Some("secret"),
        )
        .await;
        assert_eq!(json["category"], "download");

        let (_, json) = get("/admin/classify?method=HEAD&path=/Items/1/Images/Primary", Some("secret")).await;
        assert_eq!(json["category"], "unclassified");
    }
}
