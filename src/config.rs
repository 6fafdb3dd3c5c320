use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::keys::KeyError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },
    #[error("unsupported signing algorithm {0:?}: must be HS512 or ES384")]
    UnsupportedAlgorithm(String),
    #[error("secret must be at least {min} bytes long")]
    SecretTooShort { min: usize },
    #[error("missing JWT {0} key path")]
    MissingKeyPath(&'static str),
    #[error(transparent)]
    Key(#[from] KeyError),
}

#[derive(Clone)]
pub struct JwtConfig {
    /// `HS512` or `ES384`.
    pub algorithm: String,
    pub lifetime: Duration,
    pub secret: String,
    pub private_key_path: Option<PathBuf>,
    pub public_key_path: Option<PathBuf>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("lifetime", &self.lifetime)
            .field("secret", &"<redacted>")
            .field("private_key_path", &self.private_key_path)
            .field("public_key_path", &self.public_key_path)
            .finish()
    }
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let lifetime_hours = match std::env::var("JWT_LIFETIME") {
            Ok(v) => v.trim().parse::<u64>().map_err(|_| ConfigError::InvalidVar {
                name: "JWT_LIFETIME",
                value: v,
            })?,
            Err(_) => 24,
        };
        Ok(Self {
            algorithm: std::env::var("JWT_ALGO").map_err(|_| ConfigError::MissingVar("JWT_ALGO"))?,
            lifetime: Duration::from_secs(lifetime_hours * 60 * 60),
            secret: std::env::var("JWT_SECRET").unwrap_or_default(),
            private_key_path: path_var("JWT_PRIVATE_KEY_PATH"),
            public_key_path: path_var("JWT_PUBLIC_KEY_PATH"),
        })
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.trim().parse::<u16>().map_err(|_| ConfigError::InvalidVar {
                name: "APP_PORT",
                value: v,
            })?,
            Err(_) => 8080,
        };
        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            jwt: JwtConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let cfg = JwtConfig {
            algorithm: "HS512".into(),
            lifetime: Duration::from_secs(3600),
            secret: "my-very-secret".into(),
            private_key_path: None,
            public_key_path: None,
        };
        let out = format!("{cfg:?}");
        assert!(!out.contains("my-very-secret"));
        assert!(out.contains("<redacted>"));
    }
}
