use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

const SQL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    #[error("a location is required to parse a SQL datetime")]
    MissingLocation,
    #[error("invalid datetime {value:?}: {source}")]
    Parse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("{value:?} does not exist in {location}")]
    NonexistentLocalTime { value: String, location: Tz },
}

/// A point in time carried together with the zone it is expressed in.
///
/// Equality compares the absolute instant only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Tz>);

impl Timestamp {
    /// Re-expresses `value` in `location` (UTC when `None`): wall-clock fields
    /// change, the instant does not.
    pub fn new<T: TimeZone>(value: DateTime<T>, location: Option<Tz>) -> Self {
        Self(value.with_timezone(&location.unwrap_or(Tz::UTC)))
    }

    pub fn now() -> Self {
        Self::new(Utc::now(), None)
    }

    pub fn value(&self) -> DateTime<Tz> {
        self.0
    }

    pub fn location(&self) -> Tz {
        self.0.timezone()
    }

    pub fn unix_timestamp(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    /// `YYYY-MM-DD HH:MM:SS` in the timestamp's own zone, without offset.
    pub fn to_sql(&self) -> String {
        self.0.format(SQL_FORMAT).to_string()
    }

    /// RFC 3339 with second precision; a zero offset is written as `Z`.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// The SQL form carries no offset, so the zone it was written in must be
    /// supplied.
    pub fn parse_sql(value: &str, location: Option<Tz>) -> Result<Self, TimestampError> {
        let location = location.ok_or(TimestampError::MissingLocation)?;
        let naive = NaiveDateTime::parse_from_str(value, SQL_FORMAT).map_err(|source| {
            TimestampError::Parse {
                value: value.to_string(),
                source,
            }
        })?;
        // Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant.
        let local = location
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| TimestampError::NonexistentLocalTime {
                value: value.to_string(),
                location,
            })?;
        Ok(Self(local))
    }

    pub fn parse_rfc3339(value: &str, location: Option<Tz>) -> Result<Self, TimestampError> {
        let parsed =
            DateTime::parse_from_rfc3339(value).map_err(|source| TimestampError::Parse {
                value: value.to_string(),
                source,
            })?;
        Ok(Self::new(parsed, location))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::new(value, None)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}
