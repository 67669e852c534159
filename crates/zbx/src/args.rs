//! Value parsers for command line flags.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike};

/// Layout of local times on the command line and in output.
pub const LOCAL_MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parse `YYYY-MM-DDTHH:MM` in the local time zone.
pub fn parse_local_time(s: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(s, LOCAL_MINUTE_FORMAT)
        .map_err(|e| format!("expected {LOCAL_MINUTE_FORMAT}: {e}"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("{s} does not exist in the local time zone"))
}

/// Now, truncated to the minute.
pub fn now_minute() -> DateTime<Local> {
    let now = Local::now();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// Parse durations such as `90m`, `1h30m`, `3600s` or `1d`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration".into());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit: u64 = match c {
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => return Err(format!("invalid duration {s:?}: unknown unit {c:?}")),
        };
        if digits.is_empty() {
            return Err(format!("invalid duration {s:?}: missing number before {c:?}"));
        }
        let n: u64 = digits
            .parse()
            .map_err(|e| format!("invalid duration {s:?}: {e}"))?;
        digits.clear();
        total = n
            .checked_mul(unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| format!("duration {s:?} is too long"))?;
    }
    if !digits.is_empty() {
        return Err(format!("invalid duration {s:?}: missing unit after {digits}"));
    }
    Ok(Duration::from_secs(total))
}

/// Inverse of [`parse_duration`] for whole seconds, e.g. `1h30m`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs == 0 {
        return "0s".into();
    }
    [
        (secs / 86_400, 'd'),
        (secs / 3_600 % 24, 'h'),
        (secs / 60 % 60, 'm'),
        (secs % 60, 's'),
    ]
    .iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, unit)| format!("{n}{unit}"))
    .collect()
}
