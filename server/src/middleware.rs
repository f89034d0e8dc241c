//! CORS headers and the allowed-method gate.
//!
//! Runs ahead of routing on every path. Methods outside `ALLOWED_METHODS` are
//! refused with 405, `OPTIONS` and `HEAD` are answered directly with 204, and
//! every response leaving the server gets the CORS headers.

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
    Method::HEAD,
];

pub const ALLOWED_METHODS_LIST: &str = "GET, POST, PATCH, DELETE, OPTIONS, HEAD";

pub const ALLOWED_HEADERS_LIST: &str =
    "X-Requested-With, X-HTTP-Method-Override, Content-Type, Accept";

const MAX_AGE_SECS: &str = "86400";

pub async fn cors_and_method_gate(request: Request, next: Next) -> Response {
    let method = request.method().clone();

    let mut response = if !ALLOWED_METHODS.contains(&method) {
        tracing::debug!(%method, "method not allowed");
        let mut response = (StatusCode::METHOD_NOT_ALLOWED, Json(json!({}))).into_response();
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS_LIST));
        response
    } else if method == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS_LIST),
        );
        response
    } else if method == Method::HEAD {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS_LIST),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE_SECS),
    );
    response
}
