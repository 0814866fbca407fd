/// Configuration management for the API server
///
/// Configuration is loaded once at process start from environment variables
/// (with `.env` support for development); there is no hot-reload.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `JWT_SECRET`: Secret key for token signing (required, min 32 chars)
/// - `TOKEN_TTL_HOURS`: Token and cookie lifetime (default: 24)
/// - `SMTP_HOST` / `SMTP_PORT` / `SMTP_USERNAME` / `SMTP_PASSWORD`: Mail relay
/// - `MAIL_FROM`: Sender address for notifications
/// - `CONTACT_EMAIL`: Operator contact receiving registration notices (required)

use memberclub_shared::{db::pool::DatabaseConfig, mail::MailConfig};
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// SMTP configuration
    pub mail: MailConfig,

    /// Operator contact address receiving registration notices
    pub contact_address: String,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for token signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub jwt_secret: String,

    /// Token lifetime in hours; the `jwt` cookie max-age mirrors it but the
    /// `exp` claim inside the token is what is enforced
    pub token_ttl_hours: i64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()?;

        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()?;

        let mail_from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@memberclub.example".to_string());

        let contact_address = env::var("CONTACT_EMAIL")
            .map_err(|_| anyhow::anyhow!("CONTACT_EMAIL environment variable is required"))?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                ..Default::default()
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
            },
            mail: MailConfig {
                smtp_host,
                smtp_port,
                smtp_username: env::var("SMTP_USERNAME").ok(),
                smtp_password: env::var("SMTP_PASSWORD").ok(),
                from_address: mail_from,
            },
            contact_address,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::default(),
            auth: AuthConfig {
                jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                token_ttl_hours: 24,
            },
            mail: MailConfig {
                smtp_host: "localhost".to_string(),
                smtp_port: 587,
                smtp_username: None,
                smtp_password: None,
                from_address: "noreply@memberclub.example".to_string(),
            },
            contact_address: "contact@memberclub.example".to_string(),
        };

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}
