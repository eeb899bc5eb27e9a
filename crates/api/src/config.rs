use jalsuraksha_core::encoding::MAX_PHOTO_BYTES;
use jalsuraksha_genai::AssessorConfig;

use crate::auth::jwt::JwtConfig;

/// The single municipal admin account.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    /// Login email, compared case-insensitively.
    pub email: String,
    /// Argon2id PHC hash. `None` disables admin login.
    pub password_hash: Option<String>,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Upper bound for an uploaded photo, in bytes.
    pub max_photo_bytes: usize,
    /// Session token configuration.
    pub jwt: JwtConfig,
    pub admin: AdminAccount,
    /// Assessment backend selection and limits.
    pub assessor: AssessorConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:9002`    |
    /// | `REQUEST_TIMEOUT_SECS` | `60`                       |
    /// | `MAX_PHOTO_BYTES`      | `5242880` (5 MiB)          |
    /// | `ADMIN_EMAIL`          | `admin@indore.gov.in`      |
    /// | `ADMIN_PASSWORD_HASH`  | unset (admin login off)    |
    ///
    /// JWT and assessment settings are documented on [`JwtConfig::from_env`]
    /// and [`AssessorConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on malformed values, and when the request timeout does not
    /// leave room for two assessment attempts.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:9002".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_photo_bytes: usize = std::env::var("MAX_PHOTO_BYTES")
            .unwrap_or_else(|_| MAX_PHOTO_BYTES.to_string())
            .parse()
            .expect("MAX_PHOTO_BYTES must be a valid usize");

        let admin = AdminAccount {
            email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@indore.gov.in".into()),
            password_hash: std::env::var("ADMIN_PASSWORD_HASH")
                .ok()
                .filter(|h| !h.trim().is_empty()),
        };

        let jwt = JwtConfig::from_env();
        let assessor = AssessorConfig::from_env();

        assert!(
            request_timeout_secs > 2 * assessor.timeout.as_secs(),
            "REQUEST_TIMEOUT_SECS must exceed twice ASSESSMENT_TIMEOUT_SECS"
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_photo_bytes,
            jwt,
            admin,
            assessor,
        }
    }

    /// Largest request body accepted: a photo as base64 plus form overhead.
    pub fn body_limit_bytes(&self) -> usize {
        self.max_photo_bytes / 3 * 4 + 64 * 1024
    }
}
