/// Database models for Memberclub
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `account`: Member accounts and their credentials
/// - `role`: Membership tiers (immutable reference data)
/// - `onboarding`: Professional experience and formation records collected
///   during multi-step signup

pub mod account;
pub mod onboarding;
pub mod role;
