/// Onboarding detail records
///
/// Professional experiences and formations are collected during the
/// multi-step signup. Every record is owned by an account (the owning id is a
/// required input, sourced from the caller's authenticated context) and is
/// cascade-deleted with it. Records are created once and never updated.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A professional experience row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProfessionalExperience {
    /// Unique record id
    pub id: Uuid,

    /// Owning account
    pub account_id: Uuid,

    /// Position title
    pub title: String,

    /// Free-form description
    pub description: Option<String>,

    /// Employer name
    pub company_name: Option<String>,

    /// When the position started
    pub start_date: Option<NaiveDate>,

    /// When the position ended (None while currently held)
    pub end_date: Option<NaiveDate>,

    /// Whether the position is currently held
    pub currently_held: bool,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Input for one professional experience
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfessionalExperience {
    /// Position title
    pub title: String,

    /// Free-form description
    pub description: Option<String>,

    /// Employer name
    pub company_name: Option<String>,

    /// When the position started
    pub start_date: Option<NaiveDate>,

    /// When the position ended
    pub end_date: Option<NaiveDate>,

    /// Whether the position is currently held
    #[serde(default)]
    pub currently_held: bool,
}

impl ProfessionalExperience {
    /// Inserts one experience record for an account
    pub async fn create(
        pool: &PgPool,
        account_id: Uuid,
        data: NewProfessionalExperience,
    ) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, ProfessionalExperience>(
            r#"
            INSERT INTO professional_experiences
                (account_id, title, description, company_name, start_date,
                 end_date, currently_held)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, account_id, title, description, company_name,
                      start_date, end_date, currently_held, created_at
            "#,
        )
        .bind(account_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.company_name)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.currently_held)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Lists all experience records of an account, oldest first
    pub async fn list_for_account(
        pool: &PgPool,
        account_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let records = sqlx::query_as::<_, ProfessionalExperience>(
            r#"
            SELECT id, account_id, title, description, company_name,
                   start_date, end_date, currently_held, created_at
            FROM professional_experiences
            WHERE account_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(account_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}

/// A formation (education) row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Formation {
    /// Unique record id
    pub id: Uuid,

    /// Owning account
    pub account_id: Uuid,

    /// Diploma or course title
    pub title: String,

    /// Issuing institution
    pub institution: Option<String>,

    /// Free-form description
    pub description: Option<String>,

    /// When the formation was obtained
    pub date: Option<NaiveDate>,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Input for one formation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFormation {
    /// Diploma or course title
    pub title: String,

    /// Issuing institution
    pub institution: Option<String>,

    /// Free-form description
    pub description: Option<String>,

    /// When the formation was obtained
    pub date: Option<NaiveDate>,
}

impl Formation {
    /// Inserts one formation record for an account
    pub async fn create(
        pool: &PgPool,
        account_id: Uuid,
        data: NewFormation,
    ) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, Formation>(
            r#"
            INSERT INTO formations (account_id, title, institution, description, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, account_id, title, institution, description, date, created_at
            "#,
        )
        .bind(account_id)
        .bind(data.title)
        .bind(data.institution)
        .bind(data.description)
        .bind(data.date)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Lists all formation records of an account, oldest first
    pub async fn list_for_account(
        pool: &PgPool,
        account_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let records = sqlx::query_as::<_, Formation>(
            r#"
            SELECT id, account_id, title, institution, description, date, created_at
            FROM formations
            WHERE account_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(account_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
