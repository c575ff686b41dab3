//! Duration strings used throughout `host.toml`.
//!
//! Accepted forms: `"250ms"`, `"30s"`, `"5m"`, or a bare number of seconds.

use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Parse a duration string like "30s", "5m" or "250ms".
///
/// Returns `None` for anything that is not one of the accepted forms.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Parse a duration that came from a named config field.
pub fn parse_duration_field(field: &'static str, value: &str) -> ConfigResult<Duration> {
    parse_duration(value).ok_or_else(|| ConfigError::InvalidDuration {
        field,
        value: value.to_string(),
    })
}
