use std::fmt;
use thiserror::Error;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{OffsetDateTimeExt, TimeZone, Tz, timezones};

/// Zone this dashboard is published in when nothing else is configured.
pub const DEFAULT_ZONE: &str = "America/New_York";

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("invalid timestamp {0:?}: {1}")]
    Parse(String, time::error::Parse),
    #[error("format timestamp: {0}")]
    Format(#[from] time::error::Format),
}

/// Target zone for displayed times: an IANA zone with its DST rules, or a
/// fixed UTC offset.
#[derive(Clone, Copy)]
pub enum Zone {
    Named(&'static Tz),
    Fixed(UtcOffset),
}

impl Zone {
    pub const UTC: Zone = Zone::Fixed(UtcOffset::UTC);

    pub fn convert(self, at: OffsetDateTime) -> OffsetDateTime {
        match self {
            Zone::Named(tz) => at.to_timezone(tz),
            Zone::Fixed(offset) => at.to_offset(offset),
        }
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Named(tz) => write!(f, "Named({})", tz.name()),
            Zone::Fixed(offset) => write!(f, "Fixed({offset})"),
        }
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Zone::Named(a), Zone::Named(b)) => a.name() == b.name(),
            (Zone::Fixed(a), Zone::Fixed(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Zone {}

/// Parses `updated_at` as sent by the API: UTC, second precision, `Z` suffix.
pub fn parse_api_timestamp(text: &str) -> Result<OffsetDateTime, TimestampError> {
    PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|e| TimestampError::Parse(text.to_string(), e))
}

/// Accepts an IANA name such as `America/New_York`, `UTC`, `Z`, or a signed
/// `HH:MM` offset such as `-05:00`.
pub fn parse_zone(text: &str) -> Result<Zone, String> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("utc") || text == "Z" {
        return Ok(Zone::UTC);
    }

    if text.starts_with(['+', '-']) {
        return UtcOffset::parse(
            text,
            format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
        )
        .map(Zone::Fixed)
        .map_err(|_| format!("invalid UTC offset {text:?} (expected e.g. -05:00)"));
    }

    timezones::get_by_name(text)
        .map(Zone::Named)
        .ok_or_else(|| format!("unknown time zone {text:?} (expected e.g. America/New_York)"))
}

pub fn format_run_time(at: OffsetDateTime, zone: Zone) -> Result<String, TimestampError> {
    Ok(zone.convert(at).format(format_description!(
        "[hour]:[minute] [month repr:short] [day], [year]"
    ))?)
}

/// Rewrites an API timestamp into `zone`, or returns it untouched when no
/// zone is configured.
pub fn localize(updated_at: &str, zone: Option<Zone>) -> Result<String, TimestampError> {
    match zone {
        Some(zone) => format_run_time(parse_api_timestamp(updated_at)?, zone),
        None => Ok(updated_at.to_string()),
    }
}

/// The "Last Updated" stamp. Uses a two-digit year, unlike row timestamps.
pub fn format_generated_at(now: OffsetDateTime, zone: Zone) -> Result<String, TimestampError> {
    Ok(zone.convert(now).format(format_description!(
        "[hour]:[minute] [month repr:short] [day], [year repr:last_two]"
    ))?)
}
