use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::validation::{ValidationError, ValidationErrors};

/// Opaque identity of a user, backed by a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(Uuid);

impl Id {
    /// Fresh random identifier, used at registration.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Only the lowercase hyphenated 36-character form is accepted, so a
    /// parsed id always prints back as its input. Uppercase, braced, URN and
    /// simple forms are rejected.
    pub fn parse(value: &str) -> Result<Self, ValidationErrors> {
        if value.is_empty() {
            return Err(ValidationErrors::single(ValidationError::required("id")));
        }
        if value.len() != uuid::fmt::Hyphenated::LENGTH
            || value.bytes().any(|b| b.is_ascii_uppercase())
        {
            return Err(malformed(value));
        }
        Uuid::try_parse(value).map(Self).map_err(|_| malformed(value))
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

fn malformed(value: &str) -> ValidationErrors {
    ValidationErrors::single(ValidationError::new("id", "uuid", value))
}

impl From<Uuid> for Id {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for Id {
    type Err = ValidationErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_uuid_and_round_trips() {
        let raw = "550e8400-e29b-41d4-a716-446655440000";
        let id = Id::parse(raw).expect("valid uuid");
        assert_eq!(id.to_string(), raw);
        assert_eq!(id.value(), Uuid::parse_str(raw).expect("uuid"));
    }

    #[test]
    fn rejects_malformed_values() {
        for raw in [
            "f5ds415f4",
            "550e8400e29b41d4a716446655440000",
            "{550e8400-e29b-41d4-a716-446655440000}",
            "550e8400-e29b-41d4-a716-44665544000g",
            "550E8400-E29B-41D4-A716-446655440000",
            "urn:uuid:550e8400-e29b-41d4-a716-446655440000",
        ] {
            let err = Id::parse(raw).unwrap_err();
            assert_eq!(err.errors()[0].tag, "uuid", "{raw}");
        }
    }

    #[test]
    fn every_accepted_value_prints_back_unchanged() {
        for raw in [
            "550e8400-e29b-41d4-a716-446655440000",
            "00000000-0000-0000-0000-000000000000",
            "ffffffff-ffff-ffff-ffff-ffffffffffff",
        ] {
            assert_eq!(Id::parse(raw).expect("valid").to_string(), raw);
        }
        let generated = Id::generate().to_string();
        assert_eq!(Id::parse(&generated).expect("valid").to_string(), generated);
    }

    #[test]
    fn empty_value_is_required() {
        let err = Id::parse("").unwrap_err();
        assert_eq!(err, ValidationErrors::single(ValidationError::required("id")));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(Id::generate(), Id::generate());
    }

    #[test]
    fn serde_uses_string_form() {
        let id = Id::generate();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{id}\""));
        let back: Id = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
