/// Account lifecycle endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Create an unconfirmed account and start onboarding
/// - `POST /v1/auth/login` - Authenticate and establish a session
/// - `POST /v1/auth/logout` - Destroy the session and clear the cookie
///
/// Registration inserts the account directly and lets the unique constraint
/// on the email column decide duplicates: two concurrent submissions with the
/// same address cannot both win, and the loser gets the duplicate-email
/// outcome rather than an opaque persistence error. The password is hashed
/// before the insert; plaintext is never persisted on any path.
///
/// A successful registration issues a token and session immediately so the
/// following onboarding steps carry an authenticated account id, but login
/// stays gated on manual activation of the account.

use crate::{
    app::{AppState, AuthSession, JWT_COOKIE},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Extension, State},
    http::{header::SET_COOKIE, StatusCode},
    response::AppendHeaders,
    Json,
};
use chrono::{Duration, NaiveDate};
use memberclub_shared::{
    auth::{jwt, password, session::Identity},
    mail::registration_notice,
    models::{
        account::{Account, CreateAccount},
        role::{MembershipTier, Role},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Where the client goes after a successful registration
const SIGNUP_STEP2: &str = "/inscriptionstep2";

/// Post-login destinations, branched on the role name
const VIP_HOME: &str = "/compte-annuel-vip";
const MEMBER_HOME: &str = "/compte-annuel";

/// Where the client goes after logout
const LOGIN_PAGE: &str = "/login-register";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address; its local part becomes the username
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Must match `password`
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    /// Requested membership tier (defaults to MEMBER_FREE)
    pub user_type: Option<String>,

    /// Contact phone number
    pub phone_number: Option<String>,

    /// First name
    pub first_name: Option<String>,

    /// Last name
    pub last_name: Option<String>,

    /// Birth date
    pub birth_date: Option<NaiveDate>,

    /// Postal address
    pub address: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// New account id
    pub account_id: Uuid,

    /// Registered email
    pub email: String,

    /// Derived username
    pub username: String,

    /// Onboarding token (also set as the `jwt` cookie)
    pub token: String,

    /// Next onboarding step
    pub next: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Account id
    pub account_id: Uuid,

    /// Account email
    pub email: String,

    /// Role name
    pub role: String,

    /// Access token (also set as the `jwt` cookie)
    pub token: String,

    /// Post-login destination, branched on the role
    pub destination: String,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Confirmation message
    pub message: String,

    /// Where the client should navigate next
    pub destination: String,
}

/// Registers a new member account
///
/// Precondition order: request shape (password confirmation included), then
/// tier resolution, then the insert whose unique constraint decides
/// duplicates. The operator notification is best-effort; a delivery failure
/// is logged and does not undo the account.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(
    StatusCode,
    AppendHeaders<[(axum::http::HeaderName, String); 1]>,
    Json<RegisterResponse>,
)> {
    req.validate()?;

    let tier_name = req
        .user_type
        .clone()
        .unwrap_or_else(|| MembershipTier::Free.as_str().to_string());

    let role = Role::find_by_name(&state.db, &tier_name)
        .await?
        .ok_or(ApiError::UnknownRole)?;

    let password_hash = password::hash_password(&req.password)?;
    let username = Account::derive_username(&req.email);

    let account = Account::create(
        &state.db,
        CreateAccount {
            email: req.email.clone(),
            username: username.clone(),
            password_hash,
            phone_number: req.phone_number.clone(),
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            birth_date: req.birth_date,
            address: req.address.clone(),
            role_id: role.id,
        },
    )
    .await?;

    let tier_label = role.tier().map(|t| t.label()).unwrap_or(role.name.as_str());
    let notice = registration_notice(
        req.first_name.as_deref().unwrap_or(""),
        req.last_name.as_deref().unwrap_or(""),
        &account.email,
        req.phone_number.as_deref().unwrap_or(""),
        tier_label,
    );

    if let Err(e) = state
        .notifier
        .send(&state.config.contact_address, "New account", &notice)
        .await
    {
        tracing::warn!(account_id = %account.id, "Registration notice not delivered: {}", e);
    }

    let identity = Identity {
        account_id: account.id,
        email: account.email.clone(),
        role: role.name.clone(),
    };
    let (token, cookie) = issue_session(&state, identity).await?;

    tracing::info!(account_id = %account.id, tier = %role.name, "Account created, pending activation");

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(RegisterResponse {
            account_id: account.id,
            email: account.email,
            username,
            token,
            next: SIGNUP_STEP2.to_string(),
        }),
    ))
}

/// Authenticates a member
///
/// Unknown email and wrong password produce the same `invalid_credentials`
/// outcome. A correct password on an unactivated account is the distinct
/// `not_confirmed` rejection and never yields a session.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(
    AppendHeaders<[(axum::http::HeaderName, String); 1]>,
    Json<LoginResponse>,
)> {
    req.validate()?;

    let found = Account::find_by_email_with_role(&state.db, &req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(&req.password, &found.account.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    if !found.account.is_confirmed {
        return Err(ApiError::NotConfirmed);
    }

    Account::update_last_login(&state.db, found.account.id).await?;

    let identity = Identity {
        account_id: found.account.id,
        email: found.account.email.clone(),
        role: found.role_name.clone(),
    };
    let (token, cookie) = issue_session(&state, identity).await?;

    let destination = if found.role_name == MembershipTier::Vip.as_str() {
        VIP_HOME
    } else {
        MEMBER_HOME
    };

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            account_id: found.account.id,
            email: found.account.email,
            role: found.role_name,
            token,
            destination: destination.to_string(),
        }),
    ))
}

/// Destroys the caller's session and clears the cookie
///
/// A session that cannot be destroyed is a server error, not a silent
/// success. The response forbids caching so a back-navigation cannot show
/// authenticated content.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<(
    AppendHeaders<[(axum::http::HeaderName, String); 4]>,
    Json<LogoutResponse>,
)> {
    if !state.sessions.destroy(auth.sid).await {
        return Err(ApiError::Internal("Session could not be destroyed".to_string()));
    }

    Ok((
        AppendHeaders([
            (SET_COOKIE, clear_auth_cookie()),
            (
                axum::http::header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, private".to_string(),
            ),
            (axum::http::header::EXPIRES, "0".to_string()),
            (axum::http::header::PRAGMA, "no-cache".to_string()),
        ]),
        Json(LogoutResponse {
            message: "Logged out".to_string(),
            destination: LOGIN_PAGE.to_string(),
        }),
    ))
}

/// Establishes a session and signs a token for the identity
///
/// Both artifacts carry the same identity triple and expire on the same
/// schedule; the cookie max-age mirrors them but is advisory only.
async fn issue_session(state: &AppState, identity: Identity) -> ApiResult<(String, String)> {
    let ttl = Duration::hours(state.config.auth.token_ttl_hours);

    let sid = state.sessions.establish(identity.clone(), ttl).await;
    let claims = jwt::Claims::new(&identity, sid, ttl);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    let cookie = format!(
        "{JWT_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.num_seconds()
    );

    Ok((token, cookie))
}

/// An expired cookie replacing the `jwt` value
fn clear_auth_cookie() -> String {
    format!("{JWT_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
