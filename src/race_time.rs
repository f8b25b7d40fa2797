// ============================================================================
// FORMATTING
// ============================================================================

const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_HOUR: u64 = 3_600_000;

/// Formats a race time in milliseconds as `MM:SS.HH`, or `SS.HH` below one minute.
///
/// Fields are truncated, never rounded. The minutes field wraps at 60, so hour-scale
/// magnitude is dropped (`3_600_000` renders as `00:00.00`). Use [`format_duration_long`]
/// when races can last an hour or more.
pub fn format_duration(ms: u64) -> String {
    let hundredths = (ms / 10) % 100;
    let seconds = (ms / 1000) % 60;
    let minutes = (ms / MS_PER_MINUTE) % 60;

    if ms >= MS_PER_MINUTE {
        format!("{:02}:{:02}.{:02}", minutes, seconds, hundredths)
    } else {
        format!("{:02}.{:02}", seconds, hundredths)
    }
}

/// Like [`format_duration`] but keeps an hours field (`H:MM:SS.HH`) instead of wrapping.
pub fn format_duration_long(ms: u64) -> String {
    if ms < MS_PER_HOUR {
        return format_duration(ms);
    }

    let hours = ms / MS_PER_HOUR;
    let minutes = (ms / MS_PER_MINUTE) % 60;
    let seconds = (ms / 1000) % 60;
    let hundredths = (ms / 10) % 100;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, hundredths)
}

/// Formats a signed difference to a reference time. Positive diffs get a leading `+`.
pub fn format_diff(ms: i64) -> String {
    let magnitude = format_duration(ms.unsigned_abs());
    match ms {
        d if d > 0 => format!("+{}", magnitude),
        d if d < 0 => format!("-{}", magnitude),
        _ => magnitude,
    }
}

/// Formats a time ratio against the winner (1.0 = winning time) as a signed percentage.
/// `1.024` becomes `+2.40%`.
pub fn format_diff_percentage(ratio: f64) -> String {
    let percent = (ratio - 1.0) * 100.0;
    if ratio > 1.0 {
        format!("+{:.2}%", percent)
    } else {
        format!("{:.2}%", percent)
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parses a race-time string such as `1:08.61`, `+0.62`, `1:02:03.4` or `48.123` into
/// milliseconds. The fractional part may carry tenths, hundredths or milliseconds.
/// Returns `None` for anything that is not a time or does not fit in a `u64`.
pub fn parse_race_time(s: &str) -> Option<u64> {
    let s = s.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    if s.is_empty() {
        return None;
    }

    let (whole, fraction) = match s.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (s, None),
    };

    let parts: Vec<&str> = whole.split(':').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    // Right to left: seconds, minutes, hours
    let multipliers = [1000, MS_PER_MINUTE, MS_PER_HOUR];
    let mut ms = 0u64;
    for (part, multiplier) in parts.iter().rev().zip(multipliers) {
        let field = part.parse::<u64>().ok()?.checked_mul(multiplier)?;
        ms = ms.checked_add(field)?;
    }

    if let Some(fraction) = fraction {
        if fraction.is_empty() || fraction.len() > 3 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let value: u64 = fraction.parse().ok()?;
        let fraction_ms = match fraction.len() {
            1 => value * 100,
            2 => value * 10,
            _ => value,
        };
        ms = ms.checked_add(fraction_ms)?;
    }

    Some(ms)
}

// ============================================================================
// TESTS
// ============================================================================
