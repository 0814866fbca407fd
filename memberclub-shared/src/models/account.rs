/// Account model and database operations
///
/// An account is the identity record of a member: unique email, derived
/// username, hashed password, manual-activation flag, contact fields, and a
/// reference to exactly one role. Accounts are created unconfirmed at
/// registration and are never hard-deleted by this service.
///
/// Email uniqueness is enforced by the database constraint alone. Callers
/// must treat the unique-constraint violation raised by `create` or
/// `update_profile` as the authoritative duplicate signal rather than
/// pre-checking with `find_by_email`, which would race under concurrent
/// submissions.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     username VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     is_confirmed BOOLEAN NOT NULL DEFAULT FALSE,
///     phone_number VARCHAR(32),
///     first_name VARCHAR(255),
///     last_name VARCHAR(255),
///     birth_date DATE,
///     address VARCHAR(512),
///     role_id UUID NOT NULL REFERENCES roles(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, email, username, password_hash, is_confirmed, phone_number, \
     first_name, last_name, birth_date, address, role_id, created_at, updated_at, last_login_at";

/// A member account row
///
/// The password hash is never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Unique account id
    pub id: Uuid,

    /// Email address, unique across all accounts
    pub email: String,

    /// Username derived from the email local part at registration
    pub username: String,

    /// Argon2id password hash, excluded from serialization
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Manual-activation gate; false until an operator confirms the account
    pub is_confirmed: bool,

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

    /// Referenced membership tier
    pub role_id: Uuid,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the member last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// An account joined with the name of its role
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AccountWithRole {
    /// The account row
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub account: Account,

    /// Name of the referenced role (e.g., "MEMBER_VIP")
    pub role_name: String,
}

/// Input for creating a new account
///
/// `password_hash` must already be an Argon2id digest; plaintext never
/// reaches this layer.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    /// Email address
    pub email: String,

    /// Derived username
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

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

    /// Membership tier to reference
    pub role_id: Uuid,
}

impl Account {
    /// Inserts a new, unconfirmed account
    ///
    /// # Errors
    ///
    /// A duplicate email surfaces as the unique-constraint violation from the
    /// database; callers map it to their duplicate-email outcome.
    pub async fn create(pool: &PgPool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO accounts
                (email, username, password_hash, phone_number, first_name,
                 last_name, birth_date, address, role_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(data.email)
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.phone_number)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.birth_date)
        .bind(data.address)
        .bind(data.role_id)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by email, joined with its role name
    ///
    /// Used by login, which needs the role name for the identity triple and
    /// the post-login destination.
    pub async fn find_by_email_with_role(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<AccountWithRole>, sqlx::Error> {
        let account = sqlx::query_as::<_, AccountWithRole>(
            r#"
            SELECT a.id, a.email, a.username, a.password_hash, a.is_confirmed,
                   a.phone_number, a.first_name, a.last_name, a.birth_date,
                   a.address, a.role_id, a.created_at, a.updated_at,
                   a.last_login_at, r.name AS role_name
            FROM accounts a
            JOIN roles r ON r.id = a.role_id
            WHERE a.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by id
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by id, joined with its role name
    ///
    /// Used by the authenticated-access guard; an absent row is an
    /// authorization failure for the caller, not a data error.
    pub async fn find_by_id_with_role(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<AccountWithRole>, sqlx::Error> {
        let account = sqlx::query_as::<_, AccountWithRole>(
            r#"
            SELECT a.id, a.email, a.username, a.password_hash, a.is_confirmed,
                   a.phone_number, a.first_name, a.last_name, a.birth_date,
                   a.address, a.role_id, a.created_at, a.updated_at,
                   a.last_login_at, r.name AS role_name
            FROM accounts a
            JOIN roles r ON r.id = a.role_id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Overwrites the email and username of an account
    ///
    /// # Errors
    ///
    /// Changing the email to one owned by another account violates the
    /// unique constraint and surfaces as a database error.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        email: &str,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(&format!(
            r#"
            UPDATE accounts
            SET email = $2, username = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(email)
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Overwrites the password hash of an account
    ///
    /// Returns `false` if the account does not exist.
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records a successful login
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE accounts SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Derives the username from the local part of an email address
    pub fn derive_username(email: &str) -> String {
        email.split('@').next().unwrap_or(email).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_username() {
        assert_eq!(Account::derive_username("jean.dupont@example.com"), "jean.dupont");
        assert_eq!(Account::derive_username("a@x.com"), "a");
        // Degenerate input keeps the whole string rather than panicking
        assert_eq!(Account::derive_username("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let account = Account {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            username: "a".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            is_confirmed: false,
            phone_number: None,
            first_name: None,
            last_name: None,
            birth_date: None,
            address: None,
            role_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("a@x.com"));
    }

    // Integration tests for database operations are in
    // memberclub-api/tests/account_flow.rs
}
