/// Security headers middleware
///
/// Adds a small set of hardening headers to every response. The cache-control
/// headers on logout are set by the logout handler itself; these apply
/// globally.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

/// Applies security headers to every response
pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}
