//! Helpers for duration parsing, timestamps and redaction.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Placeholder written in place of secrets in logs and curl echoes.
pub const REDACTED: &str = "********";

/// Format time as the UTC timestamp used in signed requests, to the millisecond.
pub fn format_time(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse a Go-style duration string (e.g. "24h", "90m", "1h30m", "45s", "500ms").
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase().replace(' ', "");
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = s.as_str();
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("missing unit in duration: {}", s))?;
        if num_end == 0 {
            return Err(format!("invalid duration: {}", s));
        }
        let num: u64 = rest[..num_end]
            .parse()
            .map_err(|_| format!("invalid duration: {}", s))?;
        rest = &rest[num_end..];
        let unit_end = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];
        let out_of_range = || format!("duration out of range: {}", s);
        let part = match unit {
            "ms" => Duration::from_millis(num),
            "s" | "sec" | "secs" => Duration::from_secs(num),
            "m" | "min" | "mins" => {
                Duration::from_secs(num.checked_mul(60).ok_or_else(out_of_range)?)
            }
            "h" | "hr" | "hour" | "hours" => {
                Duration::from_secs(num.checked_mul(3600).ok_or_else(out_of_range)?)
            }
            "d" | "day" | "days" => {
                Duration::from_secs(num.checked_mul(86400).ok_or_else(out_of_range)?)
            }
            _ => return Err(format!("unknown time unit in duration: {}", s)),
        };
        total = total.checked_add(part).ok_or_else(out_of_range)?;
    }
    Ok(total)
}

/// Keep the first few characters of an identifier and mask the rest.
pub fn mask(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    if value.chars().count() <= 4 {
        REDACTED.to_string()
    } else {
        format!("{}{}", visible, REDACTED)
    }
}
