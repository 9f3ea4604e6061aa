// Resolvers: pure functions from raw flag strings to typed request values.
// None of them read configuration or touch the network.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::error::ResolveError;

/// Platform bucket describing how certain a recognition match is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    NoMatch,
    New,
    Exact,
    Junk,
    HighAccuracy,
    Detected,
    Reinit,
    NoFace,
}

impl Confidence {
    pub const ALL: [Confidence; 8] = [
        Confidence::NoMatch,
        Confidence::New,
        Confidence::Exact,
        Confidence::Junk,
        Confidence::HighAccuracy,
        Confidence::Detected,
        Confidence::Reinit,
        Confidence::NoFace,
    ];

    /// Wire code sent to the API.
    pub fn code(self) -> u8 {
        match self {
            Confidence::NoMatch => 0,
            Confidence::New => 1,
            Confidence::Exact => 2,
            Confidence::Junk => 3,
            Confidence::HighAccuracy => 4,
            Confidence::Detected => 5,
            Confidence::Reinit => 6,
            Confidence::NoFace => 7,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| i64::from(c.code()) == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            Confidence::NoMatch => "no-match",
            Confidence::New => "new",
            Confidence::Exact => "exact",
            Confidence::Junk => "junk",
            Confidence::HighAccuracy => "high-accuracy",
            Confidence::Detected => "detected",
            Confidence::Reinit => "reinit",
            Confidence::NoFace => "no-face",
        }
    }

    fn from_alias(alias: &str) -> Option<Self> {
        let level = match alias {
            "nm" | "no-match" | "no-matches" => Confidence::NoMatch,
            "new" => Confidence::New,
            "exact" => Confidence::Exact,
            "junk" => Confidence::Junk,
            "ha" | "high-accuracy" => Confidence::HighAccuracy,
            "det" | "detected" => Confidence::Detected,
            "reinit" => Confidence::Reinit,
            "nf" | "no-face" => Confidence::NoFace,
            _ => return None,
        };
        Some(level)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Outcome of a liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    Passed,
    Failed,
    Undetermined,
}

impl Liveness {
    pub fn as_str(self) -> &'static str {
        match self {
            Liveness::Passed => "passed",
            Liveness::Failed => "failed",
            Liveness::Undetermined => "undetermined",
        }
    }
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved date bound, always transmitted in RFC3339 form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// RFC3339 with whole seconds, `Z` for UTC.
    pub fn to_wire(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

/// Resolve a confidence level from an alias (`nm`, `High-Accuracy`, ...)
/// or its numeric code.
pub fn resolve_confidence(raw: &str) -> Result<Confidence, ResolveError> {
    let lower = raw.trim().to_lowercase();
    if let Some(level) = Confidence::from_alias(&lower) {
        return Ok(level);
    }
    if lower.is_empty() {
        return Err(ResolveError::MissingValue { what: "conf" });
    }

    let code: i64 = lower.parse().map_err(|_| ResolveError::UnknownValue {
        what: "conf",
        value: raw.to_string(),
    })?;
    Confidence::from_code(code).ok_or(ResolveError::OutOfRange {
        what: "conf",
        value: code,
        min: i64::from(Confidence::NoMatch.code()),
        max: i64::from(Confidence::NoFace.code()),
    })
}

/// Resolve a liveness result. Only the three textual forms are accepted;
/// there is no numeric fallback.
pub fn resolve_liveness(raw: &str) -> Result<Liveness, ResolveError> {
    match raw.trim().to_lowercase().as_str() {
        "passed" => Ok(Liveness::Passed),
        "failed" => Ok(Liveness::Failed),
        "undetermined" => Ok(Liveness::Undetermined),
        "" => Err(ResolveError::MissingValue { what: "liveness" }),
        _ => Err(ResolveError::UnknownValue {
            what: "liveness",
            value: raw.to_string(),
        }),
    }
}

/// Resolve a date bound. Blank input is `Ok(None)`: the filter is omitted.
///
/// Accepted forms, tried in order: RFC3339 (`2024-01-15T08:30:00+03:00`),
/// then a calendar date (`2024-01-15`) taken as midnight UTC.
pub fn resolve_date(raw: &str) -> Result<Option<Timestamp>, ResolveError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(Timestamp(parsed)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let midnight = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
        return Ok(Some(Timestamp(midnight.fixed_offset())));
    }

    Err(ResolveError::UnparseableDate(raw.to_string()))
}
