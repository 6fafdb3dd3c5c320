use std::fmt;

use crate::auth::password::{hash_password, verify_password, PasswordError};

use super::validation::{ValidationError, ValidationErrors};

pub const PASSWORD_MIN_LENGTH: usize = 8;

#[derive(Clone, PartialEq, Eq)]
enum Secret {
    Plain(String),
    Hashed(String),
}

/// A user secret, either as raw input (validated) or as a stored hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Secret);

impl Password {
    /// Raw user input. Must be non-empty and at least eight characters long.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationErrors> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationErrors::single(ValidationError::required(
                "password",
            )));
        }
        if value.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(ValidationErrors::single(ValidationError::new(
                "password",
                "min",
                PASSWORD_MIN_LENGTH.to_string(),
            )));
        }
        Ok(Self(Secret::Plain(value)))
    }

    /// A hash read back from storage; the length rule does not apply.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self(Secret::Hashed(hash.into()))
    }

    pub fn is_hashed(&self) -> bool {
        matches!(self.0, Secret::Hashed(_))
    }

    pub fn value(&self) -> &str {
        match &self.0 {
            Secret::Plain(v) | Secret::Hashed(v) => v,
        }
    }

    pub fn hash(&self) -> Result<String, PasswordError> {
        match &self.0 {
            Secret::Plain(plain) => hash_password(plain),
            Secret::Hashed(_) => Err(PasswordError::AlreadyHashed),
        }
    }

    /// Checks a clear-text candidate against the stored hash.
    pub fn verify(&self, candidate: &str) -> Result<(), PasswordError> {
        match &self.0 {
            Secret::Hashed(hash) => verify_password(candidate, hash),
            Secret::Plain(_) => Err(PasswordError::Mismatch),
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_hashed() { "hashed" } else { "plain" };
        f.debug_tuple("Password").field(&kind).finish()
    }
}
