/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, logout
/// - `profile`: Authenticated profile access and mutation
/// - `onboarding`: Multi-step signup detail records

pub mod auth;
pub mod health;
pub mod onboarding;
pub mod profile;
