use lambda_http::http::header::{HeaderValue, SET_COOKIE, VARY};
use lambda_http::{http::StatusCode, Body, Response};
use serde::Serialize;

use crate::error::ApiError;

/// A JSON response carrying zero or more `Set-Cookie` headers.
pub fn json<T: Serialize>(
    status: StatusCode,
    body: &T,
    cookies: &[String],
) -> Result<Response<Body>, ApiError> {
    let body = serde_json::to_string(body)
        .map_err(|e| ApiError::internal("serialize response body", e))?;
    let resp = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .map_err(|e| ApiError::internal("build response", e))?;
    Ok(with_set_cookies(resp, cookies))
}

/// A 200 with an empty JSON object body.
pub fn ok(cookies: &[String]) -> Result<Response<Body>, ApiError> {
    json(StatusCode::OK, &serde_json::json!({}), cookies)
}

pub fn with_set_cookies(mut resp: Response<Body>, cookies: &[String]) -> Response<Body> {
    let headers = resp.headers_mut();
    for cookie in cookies {
        if let Ok(v) = HeaderValue::from_str(cookie) {
            headers.append(SET_COOKIE, v);
        }
    }
    resp
}

/// Credentialed CORS for a single allowed origin.
pub fn with_cors_headers(mut resp: Response<Body>, allowed_origin: &str) -> Response<Body> {
    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_str(allowed_origin)
            .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000")),
    );
    headers.insert("Access-Control-Allow-Credentials", HeaderValue::from_static("true"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Cookie"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));

    resp
}
