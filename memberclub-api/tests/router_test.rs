/// Router tests that run without any infrastructure
///
/// These exercise validation, the authentication layer, the session store,
/// and logout against a pool pointing at a closed port: every path that does
/// not need a database row is verified here, and the one that does proves
/// the persistence-unavailable classification.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{authenticated_token, offline_state, test_identity};
use memberclub_api::app::build_router;
use serde_json::{json, Value};
use tower::Service as _;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_register_password_mismatch_is_422() {
    let (state, _) = offline_state();
    let app = build_router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": "a@x.com",
                "password": "Secret1!pass",
                "confirm_password": "Different1!"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_register_invalid_email_is_422() {
    let (state, _) = offline_state();
    let app = build_router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": "not-an-email",
                "password": "Secret1!pass",
                "confirm_password": "Secret1!pass"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_without_database_is_503() {
    // A valid body reaches the role lookup, which cannot connect
    let (state, _) = offline_state();
    let app = build_router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": "a@x.com",
                "password": "Secret1!pass",
                "confirm_password": "Secret1!pass",
                "user_type": "MEMBER_VIP"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["error"], "persistence_unavailable");
}

#[tokio::test]
async fn test_profile_without_credentials_is_401() {
    let (state, _) = offline_state();
    let app = build_router(state);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/profile")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Missing credentials");
}

#[tokio::test]
async fn test_profile_with_garbage_token_is_401() {
    let (state, _) = offline_state();
    let app = build_router(state);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/profile")
        .header(header::AUTHORIZATION, "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_without_session_is_401() {
    // A well-signed token whose session is gone must be rejected; this is
    // what makes logout effective immediately.
    let (state, _) = offline_state();
    let app = build_router(state.clone());

    let identity = test_identity();
    let token = authenticated_token(&state, identity).await;

    // Destroy every session behind the token's back
    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/logout")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/profile")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Session expired");
}

#[tokio::test]
async fn test_logout_clears_cookie_and_forbids_caching() {
    let (state, _) = offline_state();
    let app = build_router(state.clone());

    let token = authenticated_token(&state, test_identity()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/logout")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("logout must clear the jwt cookie");
    assert!(set_cookie.starts_with("jwt=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cache_control.contains("no-store"));

    // A second logout with the same token no longer has a session
    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/logout")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_authentication_works() {
    let (state, _) = offline_state();
    let app = build_router(state.clone());

    let token = authenticated_token(&state, test_identity()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/logout")
        .header(header::COOKIE, format!("jwt={token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_onboarding_requires_authentication() {
    let (state, _) = offline_state();
    let app = build_router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/onboarding/experiences")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "experiences": [{ "title": "Developer" }] }).to_string(),
        ))
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_degrades_without_database() {
    let (state, _) = offline_state();
    let app = build_router(state);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_security_headers_applied() {
    let (state, _) = offline_state();
    let app = build_router(state);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().call(request).await.unwrap();

    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");
}
