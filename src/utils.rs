//! Formatting and validation helpers
//!
//! The panel is Brazilian Portuguese: currency is BRL, thousands are grouped
//! with `.` and decimals use `,`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike};

use crate::error::{DashboardError, Result};

/// Separator between the currency symbol and the amount
const NBSP: char = '\u{a0}';

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// `NaN`, `∞` or `-∞` the way pt-BR `Intl.NumberFormat` prints them
fn non_finite(value: f64) -> Option<(&'static str, &'static str)> {
    if value.is_nan() {
        Some(("", "NaN"))
    } else if value.is_infinite() {
        Some((if value < 0.0 { "-" } else { "" }, "∞"))
    } else {
        None
    }
}

/// Format a BRL amount: `1234.5` becomes `R$ 1.234,50`
pub fn format_currency(value: f64) -> String {
    if let Some((sign, text)) = non_finite(value) {
        return format!("{sign}R${NBSP}{text}");
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}R${NBSP}{},{frac_part}", group_thousands(int_part))
}

/// Format a plain number with at most three decimals: `1234567.5` becomes `1.234.567,5`
pub fn format_number(value: f64) -> String {
    if let Some((sign, text)) = non_finite(value) {
        return format!("{sign}{text}");
    }
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');
    let sign = if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac_part.is_empty() {
        format!("{sign}{}", group_thousands(int_part))
    } else {
        format!("{sign}{},{frac_part}", group_thousands(int_part))
    }
}

/// Render a backend timestamp as `dd/mm/yyyy, HH:MM` in the given zone.
///
/// Accepts RFC 3339 and the naive ISO form the backend emits
/// (`2024-05-01T10:30:00`, optionally with fractional seconds or a space
/// instead of `T`); naive values are taken as already local.
pub fn format_date<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<String> {
    let raw = raw.trim();
    let local = if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        parsed.with_timezone(tz).naive_local()
    } else {
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .ok_or_else(|| DashboardError::Date(raw.to_string()))?
    };
    Ok(local.format("%d/%m/%Y, %H:%M").to_string())
}

/// Wall-clock text for `#current-time`
pub fn format_clock<T: Timelike>(time: &T) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    )
}

/// A form control as seen by validation
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub required: bool,
}

/// Name validation knows a control by: its `name` attribute, else its
/// non-empty id. Kept verbatim, so `tags[]` or `items[0]` work as keys.
pub(crate) fn field_key(name: Option<String>, id: &str) -> Option<String> {
    name.or_else(|| (!id.is_empty()).then(|| id.to_string()))
}

/// Names of required fields left blank (whitespace counts as blank)
pub fn missing_required(fields: &[FormField]) -> Vec<String> {
    fields
        .iter()
        .filter(|f| f.required && f.value.trim().is_empty())
        .map(|f| f.name.clone())
        .collect()
}
