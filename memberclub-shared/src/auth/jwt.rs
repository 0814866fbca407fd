/// JWT token issuance and validation
///
/// Tokens are signed with HS256 using a process-wide secret loaded once at
/// startup. Claims carry the identity triple (account id, email, role name),
/// the session id the token was issued against, and an explicit `exp` claim.
/// Expiry is enforced here during validation; the cookie max-age handed to
/// the client is advisory only and never security-relevant.
///
/// # Example
///
/// ```
/// use memberclub_shared::auth::jwt::{create_token, validate_token, Claims};
/// use memberclub_shared::auth::session::Identity;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let identity = Identity {
///     account_id: Uuid::new_v4(),
///     email: "a@x.com".to_string(),
///     role: "MEMBER_VIP".to_string(),
/// };
/// let claims = Claims::new(&identity, Uuid::new_v4(), Duration::hours(24));
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!")?;
///
/// let validated = validate_token(&token, "secret-key-at-least-32-bytes-long!")?;
/// assert_eq!(validated.sub, identity.account_id);
/// # Ok(())
/// # }
/// ```

use crate::auth::session::Identity;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ISSUER: &str = "memberclub";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was not issued by this service
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Signature, format, or claim validation failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),
}

/// JWT claims structure
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`, `nbf`) plus the email, role
/// name, and session id custom claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account id
    pub sub: Uuid,

    /// Issuer - always "memberclub"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Account email (custom claim)
    pub email: String,

    /// Role name (custom claim)
    pub role: String,

    /// Server-side session id (custom claim)
    pub sid: Uuid,
}

impl Claims {
    /// Creates claims for an identity with the given time to live
    pub fn new(identity: &Identity, sid: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: identity.account_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            sid,
        }
    }

    /// Rebuilds the identity triple carried by these claims
    pub fn identity(&self) -> Identity {
        Identity {
            account_id: self.sub,
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token string
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Validates a token's signature, expiry, and issuer, and extracts claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(e.to_string()),
    })?;

    Ok(token_data.claims)
}
