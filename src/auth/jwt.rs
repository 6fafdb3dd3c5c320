use std::{path::Path, str::FromStr};

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, error};

use crate::{
    auth::{
        claims::Claims,
        keys::{self, KeyError, KeyHandle},
    },
    config::{ConfigError, JwtConfig},
    values::{Id, Timestamp},
};

/// Minimum HMAC secret length, in bytes.
pub const HMAC_SECRET_MIN_LENGTH: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("error when signing access token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("invalid or expired access token")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    Hs512,
    Es384,
}

impl SigningAlgorithm {
    pub fn jwt_algorithm(&self) -> Algorithm {
        match self {
            SigningAlgorithm::Hs512 => Algorithm::HS512,
            SigningAlgorithm::Es384 => Algorithm::ES384,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HS512" => Ok(SigningAlgorithm::Hs512),
            "ES384" => Ok(SigningAlgorithm::Es384),
            other => Err(ConfigError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

fn hmac_secret(cfg: &JwtConfig) -> Result<&[u8], ConfigError> {
    if cfg.secret.len() < HMAC_SECRET_MIN_LENGTH {
        return Err(ConfigError::SecretTooShort {
            min: HMAC_SECRET_MIN_LENGTH,
        });
    }
    Ok(cfg.secret.as_bytes())
}

fn wrong_key_kind(path: &Path, expected: &str) -> ConfigError {
    ConfigError::Key(KeyError::Parse {
        path: path.to_path_buf(),
        reason: format!("expected a {expected} key"),
    })
}

/// Key material the generator signs with, chosen once from the config.
#[derive(Clone)]
pub enum SigningKey {
    HmacSecret(EncodingKey),
    EcdsaKey(EncodingKey),
}

impl SigningKey {
    pub fn from_config(cfg: &JwtConfig) -> Result<Self, ConfigError> {
        match cfg.algorithm.parse::<SigningAlgorithm>()? {
            SigningAlgorithm::Hs512 => Ok(SigningKey::HmacSecret(EncodingKey::from_secret(
                hmac_secret(cfg)?,
            ))),
            SigningAlgorithm::Es384 => {
                let path = cfg
                    .private_key_path
                    .as_deref()
                    .ok_or(ConfigError::MissingKeyPath("private"))?;
                match keys::load(path, true)? {
                    KeyHandle::Private(key) => Ok(SigningKey::EcdsaKey(key)),
                    KeyHandle::Public(_) => Err(wrong_key_kind(path, "private")),
                }
            }
        }
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        match self {
            SigningKey::HmacSecret(_) => SigningAlgorithm::Hs512,
            SigningKey::EcdsaKey(_) => SigningAlgorithm::Es384,
        }
    }

    fn encoding_key(&self) -> &EncodingKey {
        match self {
            SigningKey::HmacSecret(k) | SigningKey::EcdsaKey(k) => k,
        }
    }
}

/// Key material the verifier checks signatures with.
#[derive(Clone)]
pub enum VerificationKey {
    HmacSecret(DecodingKey),
    EcdsaKey(DecodingKey),
}

impl VerificationKey {
    pub fn from_config(cfg: &JwtConfig) -> Result<Self, ConfigError> {
        match cfg.algorithm.parse::<SigningAlgorithm>()? {
            SigningAlgorithm::Hs512 => Ok(VerificationKey::HmacSecret(DecodingKey::from_secret(
                hmac_secret(cfg)?,
            ))),
            SigningAlgorithm::Es384 => {
                let path = cfg
                    .public_key_path
                    .as_deref()
                    .ok_or(ConfigError::MissingKeyPath("public"))?;
                match keys::load(path, false)? {
                    KeyHandle::Public(key) => Ok(VerificationKey::EcdsaKey(key)),
                    KeyHandle::Private(_) => Err(wrong_key_kind(path, "public")),
                }
            }
        }
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        match self {
            VerificationKey::HmacSecret(_) => SigningAlgorithm::Hs512,
            VerificationKey::EcdsaKey(_) => SigningAlgorithm::Es384,
        }
    }

    fn decoding_key(&self) -> &DecodingKey {
        match self {
            VerificationKey::HmacSecret(k) | VerificationKey::EcdsaKey(k) => k,
        }
    }
}

/// A signed credential and the moment it stops being valid.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Issues access tokens. Immutable once built; share it behind an `Arc`.
#[derive(Clone)]
pub struct TokenGenerator {
    key: SigningKey,
    lifetime: TimeDelta,
}

impl TokenGenerator {
    pub fn new(cfg: &JwtConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_key(SigningKey::from_config(cfg)?, lifetime(cfg)?))
    }

    pub fn from_key(key: SigningKey, lifetime: TimeDelta) -> Self {
        Self { key, lifetime }
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.key.algorithm()
    }

    pub fn generate(&self, user_id: &Id) -> Result<AccessToken, TokenError> {
        let now = Utc::now();
        let expires_at = now + self.lifetime;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let header = Header::new(self.key.algorithm().jwt_algorithm());
        let token = encode(&header, &claims, self.key.encoding_key()).map_err(|e| {
            error!(error = %e, user_id = %user_id, "jwt signing failed");
            TokenError::Signing(e)
        })?;
        debug!(user_id = %user_id, algorithm = ?self.key.algorithm(), "jwt signed");
        Ok(AccessToken {
            token,
            expires_at: Timestamp::from(expires_at),
        })
    }
}

fn lifetime(cfg: &JwtConfig) -> Result<TimeDelta, ConfigError> {
    TimeDelta::from_std(cfg.lifetime).map_err(|_| ConfigError::InvalidVar {
        name: "JWT_LIFETIME",
        value: format!("{:?}", cfg.lifetime),
    })
}

/// Checks access tokens issued by a [`TokenGenerator`] with the same config.
#[derive(Clone)]
pub struct TokenVerifier {
    key: VerificationKey,
}

impl TokenVerifier {
    pub fn new(cfg: &JwtConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_key(VerificationKey::from_config(cfg)?))
    }

    pub fn from_key(key: VerificationKey) -> Self {
        Self { key }
    }

    /// Validates signature, `exp` and `nbf` (with the default leeway).
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.key.algorithm().jwt_algorithm());
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["sub", "exp", "nbf", "iat"]);
        let data = decode::<Claims>(token, self.key.decoding_key(), &validation)
            .map_err(TokenError::Invalid)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}
