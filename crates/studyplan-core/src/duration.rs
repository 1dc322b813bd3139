//! Conversion between human duration text and whole seconds.
//!
//! Course catalogues describe lesson lengths in whatever form the author
//! typed: `"5:00"`, `"1:02:03"`, `"1h 30m"`, `"12 questions"`, or a bare
//! `"45"`. [`parse_duration`] turns those into seconds so the planner can do
//! capacity arithmetic, and [`format_seconds`] renders totals back for
//! display.

use std::sync::LazyLock;

use regex::Regex;

/// Placeholder shown when a duration has neither text nor a numeric value.
pub const MISSING_DURATION: &str = "—";

static HMS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([0-9]+)\s*h)?\s*(?:([0-9]+)\s*m)?\s*(?:([0-9]+)\s*s)?")
        .expect("duration pattern is valid")
});

/// Parse a free-form duration string into whole seconds.
///
/// Interpretations are tried in order, first match wins:
///
/// 1. empty input has no value
/// 2. anything mentioning "question" (quizzes) counts as zero
/// 3. `mm:ss` or `hh:mm:ss`, components taken as given (no clamping above 59)
/// 4. `<N>h <N>m <N>s` tokens at the start of the text, at least one non-zero
/// 5. a plain positive number, read as minutes
///
/// Anything else is unparseable and yields `None`.
pub fn parse_duration(duration: Option<&str>) -> Option<u64> {
    let duration = duration.filter(|d| !d.is_empty())?;
    let lower = duration.to_lowercase();

    if lower.contains("question") {
        return Some(0);
    }

    if let Some(secs) = parse_colon_form(duration) {
        return Some(secs);
    }

    if let Some(secs) = parse_unit_tokens(&lower) {
        return Some(secs);
    }

    match duration.trim().parse::<f64>() {
        Ok(minutes) if minutes.is_finite() && minutes > 0.0 => Some(round_secs(minutes * 60.0)),
        _ => None,
    }
}

fn parse_colon_form(duration: &str) -> Option<u64> {
    let parts: Vec<&str> = duration.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }

    let mut values = Vec::with_capacity(parts.len());
    for part in parts {
        let part = part.trim();
        // An empty component ("5:") counts as zero.
        let value = if part.is_empty() {
            0.0
        } else {
            part.parse::<f64>().ok()?
        };
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        values.push(value);
    }

    let total = match values.as_slice() {
        [h, m, s] => h * 3600.0 + m * 60.0 + s,
        [m, s] => m * 60.0 + s,
        _ => return None,
    };
    Some(round_secs(total))
}

fn parse_unit_tokens(lower: &str) -> Option<u64> {
    let caps = HMS_PATTERN.captures(lower)?;
    let component = |idx: usize| -> f64 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    let (h, m, s) = (component(1), component(2), component(3));
    if h == 0.0 && m == 0.0 && s == 0.0 {
        return None;
    }
    Some(round_secs(h * 3600.0 + m * 60.0 + s))
}

fn round_secs(value: f64) -> u64 {
    // `as` saturates, so absurdly large inputs pin to u64::MAX.
    value.round() as u64
}

/// Format a second count as `H:MM:SS` (one hour or more) or `M:SS`.
///
/// `None` and NaN have no display form. Negative values clamp to zero and
/// fractional values round to the nearest second.
pub fn format_seconds(seconds: Option<f64>) -> Option<String> {
    let seconds = seconds.filter(|s| s.is_finite())?;
    Some(format_clock(round_secs(seconds.max(0.0))))
}

/// `H:MM:SS` / `M:SS` rendering of a whole second count.
pub fn format_clock(total: u64) -> String {
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Coarse `"1h 30m"` / `"2h"` / `"45m"` rendering; leftover seconds are dropped.
pub fn format_compact(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;

    if hours > 0 {
        if minutes > 0 {
            return format!("{hours}h {minutes}m");
        }
        return format!("{hours}h");
    }
    format!("{minutes}m")
}

/// Pick the display form for a lesson duration.
///
/// Non-blank text wins verbatim (trimmed), so `"12 questions"` survives
/// untouched. Otherwise the numeric value is formatted, and with neither
/// the result is [`MISSING_DURATION`].
pub fn normalize_duration(text: Option<&str>, seconds: Option<f64>) -> String {
    if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
        return text.to_string();
    }
    format_seconds(seconds).unwrap_or_else(|| MISSING_DURATION.to_string())
}
