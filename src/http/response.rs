//! Response handling and transformation.
//!
//! # Responsibilities
//! - Build the gateway's own responses (redirects, gateway errors)
//! - Strip hop-by-hop headers from forwarded messages
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Upstream connection failures result in 502 Bad Gateway
//! - Upstream timeouts result in 504 Gateway Timeout

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Response, StatusCode};

/// Headers that apply to a single connection and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();
    for name in named {
        headers.remove(name.as_str());
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

/// `302 Found` pointing at `location`, empty body.
///
/// Falls back to `502` if `location` is not a valid header value.
pub fn redirect_found(location: &str) -> Response<Body> {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::FOUND;
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => {
            tracing::warn!(location = %location, "Redirect target is not a valid header value");
            bad_gateway()
        }
    }
}

pub fn bad_gateway() -> Response<Body> {
    status_response(StatusCode::BAD_GATEWAY, "Upstream request failed")
}

pub fn gateway_timeout() -> Response<Body> {
    status_response(StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out")
}

fn status_response(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}
