/// Authenticated profile endpoints
///
/// # Endpoints
///
/// - `GET /v1/profile` - Profile view
/// - `GET /v1/profile/edit` - Profile edit view
/// - `PUT /v1/profile/info` - Overwrite email and username
/// - `PUT /v1/profile/password` - Change password
///
/// Every operation re-fetches the account by the id carried in the
/// authenticated context; an account that no longer exists is an
/// authorization failure, not a data error. The password digest never
/// appears in any response body.

use crate::{
    app::{AppState, AuthSession},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Extension, State},
    Json,
};
use memberclub_shared::{
    auth::password,
    models::account::{Account, AccountWithRole},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Update info request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInfoRequest {
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// New username
    #[validate(length(min = 1, max = 255, message = "Username must not be empty"))]
    pub username: String,
}

/// Update info response
#[derive(Debug, Serialize)]
pub struct UpdateInfoResponse {
    /// Confirmation message
    pub message: String,

    /// The updated account
    pub account: Account,
}

/// Change password request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    /// Current password
    pub old_password: String,

    /// Replacement password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,

    /// Must match `new_password`
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Change password response
#[derive(Debug, Serialize)]
pub struct UpdatePasswordResponse {
    /// Confirmation message
    pub message: String,
}

/// Profile view handler
pub async fn view_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<AccountWithRole>> {
    fetch_account(&state, &auth).await.map(Json)
}

/// Profile edit view handler
///
/// Same lookup as the profile view; kept as its own operation because the
/// client renders a different page from it.
pub async fn edit_profile_view(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<AccountWithRole>> {
    fetch_account(&state, &auth).await.map(Json)
}

/// Overwrites email and username
///
/// Moving to an email owned by another account trips the unique constraint
/// and is rejected as a duplicate, exactly like at registration.
pub async fn update_info(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<UpdateInfoRequest>,
) -> ApiResult<Json<UpdateInfoResponse>> {
    req.validate()?;

    let account = Account::update_profile(
        &state.db,
        auth.identity.account_id,
        &req.email,
        &req.username,
    )
    .await?
    .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(UpdateInfoResponse {
        message: "Info updated".to_string(),
        account,
    }))
}

/// Changes the password
///
/// The old password is verified as `(candidate, digest)`, the same
/// convention as login, and the new password is hashed before the
/// overwrite.
pub async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<UpdatePasswordResponse>> {
    req.validate()?;

    let account = Account::find_by_id(&state.db, auth.identity.account_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    if !password::verify_password(&req.old_password, &account.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let new_hash = password::hash_password(&req.new_password)?;
    Account::update_password(&state.db, account.id, &new_hash).await?;

    Ok(Json(UpdatePasswordResponse {
        message: "Password updated".to_string(),
    }))
}

/// Re-fetches the caller's account with its role
async fn fetch_account(state: &AppState, auth: &AuthSession) -> ApiResult<AccountWithRole> {
    Account::find_by_id_with_role(&state.db, auth.identity.account_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_password_rejects_mismatch() {
        let req = UpdatePasswordRequest {
            old_password: "OldSecret1!".to_string(),
            new_password: "NewSecret1!".to_string(),
            confirm_password: "Other1!pass".to_string(),
        };

        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("confirm_password"));
    }

    #[test]
    fn test_update_password_rejects_short_password() {
        let req = UpdatePasswordRequest {
            old_password: "OldSecret1!".to_string(),
            new_password: "short".to_string(),
            confirm_password: "short".to_string(),
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_info_rejects_empty_username() {
        let req = UpdateInfoRequest {
            email: "a@x.com".to_string(),
            username: "".to_string(),
        };

        assert!(req.validate().is_err());
    }
}
