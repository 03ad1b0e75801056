//! Date resolution in the configured timezone
//!
//! Unknown or missing timezone names never fail the run; they fall back to UTC.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Zone used when no valid timezone is configured
pub const FALLBACK_TZ: Tz = Tz::UTC;

/// Resolve an IANA timezone name, falling back to UTC
pub fn resolve_timezone(name: Option<&str>) -> Tz {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return FALLBACK_TZ;
    };

    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            tracing::warn!("Invalid timezone '{}', falling back to {}", name, FALLBACK_TZ);
            FALLBACK_TZ
        }
    }
}

/// Today's date (`YYYY-MM-DD`) in the named timezone
pub fn resolve_date(timezone: Option<&str>) -> String {
    resolve_date_at(timezone, Utc::now())
}

/// Date of `now` in the named timezone
pub fn resolve_date_at(timezone: Option<&str>, now: DateTime<Utc>) -> String {
    let tz = resolve_timezone(timezone);
    now.with_timezone(&tz).format("%Y-%m-%d").to_string()
}
