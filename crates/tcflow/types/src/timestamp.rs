//! ISO-8601 timestamps with millisecond precision
//!
//! The platform expects `2026-10-24T09:30:00.000Z` on requests. Responses
//! keep timestamps as the raw text the server sent; [`parse`] reads the
//! RFC 3339 and date-only forms BCF servers use.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serializer;

pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a server timestamp; a bare date means midnight UTC
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub mod millis {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }
}

pub mod millis_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&format(ts)),
            None => serializer.serialize_none(),
        }
    }
}
