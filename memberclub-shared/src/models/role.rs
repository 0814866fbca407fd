/// Role model and membership tier directory
///
/// Roles are immutable reference data seeded by migration; an account holds a
/// non-owning reference to exactly one role. The directory is looked up by
/// exact name during registration, and an unknown name is not an error at
/// this layer: it surfaces as `Ok(None)` and the workflow turns it into a
/// registration failure.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// The four membership tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipTier {
    /// Free membership
    Free,

    /// Monthly subscription
    Monthly,

    /// VIP membership, routed to its own destination after login
    Vip,

    /// Annual subscription
    Annual,
}

impl MembershipTier {
    /// Role name as stored in the roles table
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipTier::Free => "MEMBER_FREE",
            MembershipTier::Monthly => "MEMBER_MONTHLY",
            MembershipTier::Vip => "MEMBER_VIP",
            MembershipTier::Annual => "MEMBER_ANNUAL",
        }
    }

    /// Parses a role name, returning `None` for unknown tiers
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MEMBER_FREE" => Some(MembershipTier::Free),
            "MEMBER_MONTHLY" => Some(MembershipTier::Monthly),
            "MEMBER_VIP" => Some(MembershipTier::Vip),
            "MEMBER_ANNUAL" => Some(MembershipTier::Annual),
            _ => None,
        }
    }

    /// French subscription label used in the operator notification
    ///
    /// Matches the wording the operators expect: monthly subscriptions are
    /// billed quarterly, hence "Trimestriel".
    pub fn label(&self) -> &'static str {
        match self {
            MembershipTier::Monthly => "Trimestriel",
            MembershipTier::Vip => "VIP",
            MembershipTier::Free | MembershipTier::Annual => "Annuel",
        }
    }
}

/// A membership tier row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    /// Unique role id
    pub id: Uuid,

    /// Tier name, unique (e.g., "MEMBER_VIP")
    pub name: String,

    /// When the row was seeded
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Exact-match lookup by tier name
    ///
    /// Returns `Ok(None)` for an unknown tier; only infrastructure failures
    /// are errors.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, created_at
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// The tier this role names, if it is one of the known four
    pub fn tier(&self) -> Option<MembershipTier> {
        MembershipTier::from_name(&self.name)
    }
}
