/// Authentication primitives for Memberclub
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Signed token carrying the identity triple, with explicit expiry
/// - [`session`]: Server-side session store keyed by generated session ids
///
/// The identity triple (account id, email, role name) is encoded into both
/// the token and the session entry at issuance time; the API middleware
/// requires both to agree before a request is treated as authenticated.

pub mod jwt;
pub mod password;
pub mod session;
