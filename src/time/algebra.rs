//! Conversions between absolute milliseconds, phase-relative percentages, and the
//! time strings typed into the position editor.

use crate::foundation::core::validate_duration;
use crate::foundation::error::TimelineResult;

/// Convert `ms` to a percentage of `phase_duration_ms`, rounded to one decimal.
pub fn ms_to_percent(ms: f64, phase_duration_ms: f64) -> TimelineResult<f64> {
    let d = validate_duration(phase_duration_ms)?;
    Ok((ms / d * 1000.0).round() / 10.0)
}

/// Convert a phase-relative percentage back to milliseconds.
pub fn percent_to_ms(percent: f64, phase_duration_ms: f64) -> TimelineResult<f64> {
    let d = validate_duration(phase_duration_ms)?;
    Ok(percent / 100.0 * d)
}

/// Clamp `ms` into `[0, phase_duration_ms]`.
pub fn clamp_to_phase(ms: f64, phase_duration_ms: f64) -> f64 {
    ms.clamp(0.0, phase_duration_ms.max(0.0))
}

/// Parse a user-typed time.
///
/// Accepted forms: `"500ms"`, `"1.5s"` or bare `"1.5"` (seconds), and `"50%"` (of the
/// phase). Whitespace around the number and unit is ignored. Results are clamped to
/// `[0, phase_duration_ms]`. Returns `None` for anything else, including an unusable
/// phase duration, so the caller can keep the previous value.
pub fn parse_time_input(text: &str, phase_duration_ms: f64) -> Option<f64> {
    let d = validate_duration(phase_duration_ms).ok()?;
    let t = text.trim().to_ascii_lowercase();

    let ms = if let Some(num) = t.strip_suffix("ms") {
        parse_number(num)?
    } else if let Some(num) = t.strip_suffix('%') {
        parse_number(num)? / 100.0 * d
    } else if let Some(num) = t.strip_suffix('s') {
        parse_number(num)? * 1000.0
    } else {
        parse_number(&t)? * 1000.0
    };

    Some(clamp_to_phase(ms, d))
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    // f64::from_str accepts "inf"/"nan"; only plain decimals are times.
    if s.is_empty()
        || !s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
    {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render milliseconds as seconds with two decimals, e.g. `"1.50s"`.
pub fn format_ms(ms: f64) -> String {
    format!("{:.2}s", ms / 1000.0)
}

#[cfg(test)]
#[path = "../../tests/unit/time/algebra.rs"]
mod tests;
