/// Multi-step signup detail endpoints
///
/// # Endpoints
///
/// - `POST /v1/onboarding/experiences` - Save professional experiences
/// - `GET  /v1/onboarding/experiences` - List professional experiences
/// - `POST /v1/onboarding/formations` - Save formation records
/// - `GET  /v1/onboarding/formations` - List formation records
///
/// The owning account id is taken from the authenticated context established
/// at registration; a detail record can never be saved without its account
/// association. The signup form offers two slots per step, hence the upper
/// bound on each submission.

use crate::{
    app::{AppState, AuthSession},
    error::ApiResult,
};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use memberclub_shared::models::onboarding::{
    Formation, NewFormation, NewProfessionalExperience, ProfessionalExperience,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where the client goes after saving experiences
const SIGNUP_STEP3: &str = "/inscriptionstep3";

/// Where the client goes after the final signup step
const LOGIN_PAGE: &str = "/login-register";

/// Save experiences request
#[derive(Debug, Deserialize, Validate)]
pub struct SaveExperiencesRequest {
    /// One or two experiences from the signup form
    #[validate(length(min = 1, max = 2, message = "Between one and two experiences expected"))]
    pub experiences: Vec<NewProfessionalExperience>,
}

/// Save formations request
#[derive(Debug, Deserialize, Validate)]
pub struct SaveFormationsRequest {
    /// One or two formations from the signup form
    #[validate(length(min = 1, max = 2, message = "Between one and two formations expected"))]
    pub formations: Vec<NewFormation>,
}

/// Response for both onboarding steps
#[derive(Debug, Serialize)]
pub struct SaveDetailsResponse {
    /// Number of records persisted
    pub saved: usize,

    /// Next step for the client
    pub next: String,
}

/// Persists professional experiences for the authenticated account
pub async fn save_experiences(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<SaveExperiencesRequest>,
) -> ApiResult<(StatusCode, Json<SaveDetailsResponse>)> {
    req.validate()?;

    let mut saved = 0;
    for experience in req.experiences {
        ProfessionalExperience::create(&state.db, auth.identity.account_id, experience).await?;
        saved += 1;
    }

    Ok((
        StatusCode::CREATED,
        Json(SaveDetailsResponse {
            saved,
            next: SIGNUP_STEP3.to_string(),
        }),
    ))
}

/// Persists formation records for the authenticated account
pub async fn save_formations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<SaveFormationsRequest>,
) -> ApiResult<(StatusCode, Json<SaveDetailsResponse>)> {
    req.validate()?;

    let mut saved = 0;
    for formation in req.formations {
        Formation::create(&state.db, auth.identity.account_id, formation).await?;
        saved += 1;
    }

    Ok((
        StatusCode::CREATED,
        Json(SaveDetailsResponse {
            saved,
            next: LOGIN_PAGE.to_string(),
        }),
    ))
}

/// Lists the authenticated account's experience records, oldest first
pub async fn list_experiences(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<Vec<ProfessionalExperience>>> {
    let records =
        ProfessionalExperience::list_for_account(&state.db, auth.identity.account_id).await?;
    Ok(Json(records))
}

/// Lists the authenticated account's formation records, oldest first
pub async fn list_formations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<Vec<Formation>>> {
    let records = Formation::list_for_account(&state.db, auth.identity.account_id).await?;
    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_submission_rejected() {
        let req = SaveExperiencesRequest { experiences: vec![] };
        assert!(req.validate().is_err());

        let req = SaveFormationsRequest { formations: vec![] };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_two_experiences_accepted() {
        let experience: NewProfessionalExperience =
            serde_json::from_str(r#"{"title": "Developer"}"#).unwrap();

        let req = SaveExperiencesRequest {
            experiences: vec![experience.clone(), experience],
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_three_experiences_rejected() {
        let experience: NewProfessionalExperience =
            serde_json::from_str(r#"{"title": "Developer"}"#).unwrap();

        let req = SaveExperiencesRequest {
            experiences: vec![experience.clone(), experience.clone(), experience],
        };
        assert!(req.validate().is_err());
    }
}
