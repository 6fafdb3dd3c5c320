use std::fmt;

use serde::Serialize;

/// A single failed rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub tag: String,
    pub value: String,
}

impl ValidationError {
    pub fn new(field: &str, tag: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            tag: tag.to_string(),
            value: value.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(field, "required", "")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field: {}, tag: {}, value: {}", self.field, self.tag, self.value)
    }
}

/// Every rule that failed while constructing a value object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn single(err: ValidationError) -> Self {
        Self(vec![err])
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn merge(mut self, other: ValidationErrors) -> Self {
        self.0.extend(other.0);
        self
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
