/// Application state and router builder
///
/// The shared state carries the database pool, configuration, the server-side
/// session store, and the notifier behind its trait object. Authentication is
/// a router layer: it validates the signed token (from the `Authorization`
/// header or the `jwt` cookie), requires the referenced session to still be
/// alive, and injects the resulting [`AuthSession`] into request extensions
/// so handlers receive an explicit identity instead of reading ambient state.

use crate::{config::Config, error::ApiError, middleware::security::security_headers};
use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use memberclub_shared::{
    auth::{
        jwt,
        session::{Identity, SessionStore},
    },
    mail::Notifier,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

/// Name of the authentication cookie
pub const JWT_COOKIE: &str = "jwt";

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; all fields
/// are cheaply clonable handles.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Server-side session store
    pub sessions: Arc<SessionStore>,

    /// Notification sink for account events
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
            notifier,
        }
    }

    /// Gets the signing secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }
}

/// The authenticated caller, injected into request extensions
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Identity triple validated against both token and session
    pub identity: Identity,

    /// Session id the token was issued against
    pub sid: Uuid,
}

/// Builds the complete Axum router
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register           # Public
///     │   ├── POST /login              # Public
///     │   └── POST /logout             # Authenticated
///     ├── /profile/                    # Authenticated
///     │   ├── GET  /
///     │   ├── GET  /edit
///     │   ├── PUT  /info
///     │   └── PUT  /password
///     └── /onboarding/                 # Authenticated
///         ├── POST /experiences
///         ├── GET  /experiences
///         ├── POST /formations
///         └── GET  /formations
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let session_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let profile_routes = Router::new()
        .route("/", get(routes::profile::view_profile))
        .route("/edit", get(routes::profile::edit_profile_view))
        .route("/info", put(routes::profile::update_info))
        .route("/password", put(routes::profile::update_password))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let onboarding_routes = Router::new()
        .route(
            "/experiences",
            post(routes::onboarding::save_experiences).get(routes::onboarding::list_experiences),
        )
        .route(
            "/formations",
            post(routes::onboarding::save_formations).get(routes::onboarding::list_formations),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(session_routes))
        .nest("/profile", profile_routes)
        .nest("/onboarding", onboarding_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(axum::middleware::from_fn(security_headers))
        .with_state(state)
}

/// Authentication middleware layer
///
/// A request is authenticated only when its token validates and the session
/// it names still exists with the same account id. A destroyed session
/// therefore rejects a token immediately, regardless of its expiry.
async fn auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;

    let claims = jwt::validate_token(&token, state.jwt_secret())?;

    let identity = state
        .sessions
        .get(claims.sid)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Session expired".to_string()))?;

    if identity.account_id != claims.sub {
        return Err(ApiError::Unauthorized("Session mismatch".to_string()));
    }

    req.extensions_mut().insert(AuthSession {
        identity,
        sid: claims.sid,
    });

    Ok(next.run(req).await)
}

/// Pulls the token from the `Authorization: Bearer` header or the `jwt` cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    let cookies = headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == JWT_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE};

    #[test]
    fn test_extract_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());

        assert_eq!(extract_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "theme=dark; jwt=abc.def.ghi; lang=fr".parse().unwrap());

        assert_eq!(extract_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_bearer_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer from-header".parse().unwrap());
        headers.insert(COOKIE, "jwt=from-cookie".parse().unwrap());

        assert_eq!(extract_token(&headers), Some("from-header".to_string()));
    }

    #[test]
    fn test_no_credentials() {
        let headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn test_empty_cookie_value_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "jwt=".parse().unwrap());

        assert_eq!(extract_token(&headers), None);
    }
}
