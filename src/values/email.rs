use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::validation::{ValidationError, ValidationErrors};

/// A syntactically valid email address.
///
/// The value is stored exactly as given: callers that want case folding or
/// trimming must do it before construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
        )
        .unwrap();
    }
    email.len() <= 254 && EMAIL_RE.is_match(email)
}

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationErrors> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationErrors::single(ValidationError::required("email")));
        }
        if !is_valid_email(&value) {
            return Err(ValidationErrors::single(ValidationError::new(
                "email", "email", "",
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
