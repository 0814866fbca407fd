//! # Memberclub Shared Library
//!
//! Shared types and business logic used by the Memberclub API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (accounts, roles, onboarding records)
//! - `auth`: Password hashing, JWT issuance, and session tracking
//! - `db`: PostgreSQL connection pool and migrations
//! - `mail`: Operator notification delivery

pub mod auth;
pub mod db;
pub mod mail;
pub mod models;

/// Current version of the Memberclub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
