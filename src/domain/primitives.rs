//! Domain primitives: AccountName, Epoch, Timestamp.

use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed-width textual timestamp format used throughout the ledger.
///
/// The format must stay fixed-width and sortable: composite sort keys embed
/// the rendered timestamp, and lexicographic order on the rendering must
/// match chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Account name; the partition identity for balance history.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountName(pub String);

impl AccountName {
    pub fn new(name: impl Into<String>) -> Self {
        AccountName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Externally-assigned, monotonically increasing administrative period number.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn new(n: u64) -> Self {
        Epoch(n)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error parsing a textual timestamp.
#[derive(Debug, Error)]
#[error("invalid timestamp {input:?}, expected YYYY-MM-DD HH:MM:SS")]
pub struct TimestampParseError {
    pub input: String,
}

/// A UTC timestamp at second precision, rendered as `YYYY-MM-DD HH:MM:SS`.
///
/// Second precision is a property of the stored data, not a convenience:
/// the composite sort key embeds this rendering verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn new(inner: NaiveDateTime) -> Self {
        Timestamp(inner)
    }

    /// Current UTC time truncated to whole seconds.
    pub fn now() -> Self {
        let now = Utc::now().naive_utc();
        Timestamp(now.with_nanosecond(0).unwrap_or(now))
    }

    /// Parse from the ledger's fixed textual form.
    pub fn parse(s: &str) -> Result<Self, TimestampParseError> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .map(Timestamp)
            .map_err(|_| TimestampParseError {
                input: s.to_string(),
            })
    }

    pub fn plus_hours(&self, hours: i64) -> Self {
        Timestamp(self.0 + Duration::hours(hours))
    }

    pub fn inner(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Timestamp::parse(&s).map_err(serde::de::Error::custom)
    }
}
