//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT signing secret for HS256. Supports `env:VAR_NAME` indirection.
    /// When unset, a random secret is generated at startup; tokens then
    /// survive only for the lifetime of the process.
    pub jwt_secret: Option<String>,

    /// Token time-to-live in seconds.
    pub token_ttl_secs: i64,

    /// Interval between revocation registry sweeps, in seconds.
    pub sweep_interval_secs: u64,

    /// Allowed CORS origins. If empty, cross-origin requests are denied.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: 60 * 60 * 24,
            sweep_interval_secs: 300,
            allowed_origins: vec!["http://localhost:4200".to_string()],
        }
    }
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME` syntax.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.jwt_secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(secret) = self.resolve_jwt_secret()? {
            if secret == "dev-secret-change-in-production" {
                return Err(ConfigValidationError::InsecureJwtSecret);
            }
            if secret.len() < 32 {
                return Err(ConfigValidationError::JwtSecretTooShort);
            }
        }

        if self.token_ttl_secs <= 0 {
            return Err(ConfigValidationError::NonPositiveTtl);
        }

        Ok(())
    }

    /// Generate a random signing secret using the OS CSPRNG.
    pub fn generate_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// JWT secret is the insecure placeholder value.
    InsecureJwtSecret,
    /// JWT secret is too short (minimum 32 characters).
    JwtSecretTooShort,
    /// Token TTL must be positive.
    NonPositiveTtl,
    /// Environment variable not found (for `env:VAR_NAME` syntax).
    EnvVarNotFound(String),
    /// Environment variable is empty (for `env:VAR_NAME` syntax).
    EnvVarEmpty(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsecureJwtSecret => {
                write!(
                    f,
                    "JWT secret cannot be the placeholder value. Please configure a real secret."
                )
            }
            Self::JwtSecretTooShort => {
                write!(f, "JWT secret must be at least 32 characters long.")
            }
            Self::NonPositiveTtl => {
                write!(f, "token_ttl_secs must be greater than zero.")
            }
            Self::EnvVarNotFound(var) => {
                write!(
                    f,
                    "Environment variable '{}' not found (referenced via env:{} in config).",
                    var, var
                )
            }
            Self::EnvVarEmpty(var) => {
                write!(
                    f,
                    "Environment variable '{}' is empty (referenced via env:{} in config).",
                    var, var
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}
