//! Date helper functions

use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::i18n::I18n;

// Placeholders for localized month names, substituted after chrono formatting
const MONTH_LONG: &str = "\u{1}";
const MONTH_SHORT: &str = "\u{2}";

/// Format a date using a Moment.js-compatible format string, with month
/// names taken from the current language
///
/// # Examples
/// ```ignore
/// format_date(&date, "DD MMM YYYY", &i18n) // -> "15 mar 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str, i18n: &I18n) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = moment_to_chrono_format(format);
    let month = date.month();

    date.format(&chrono_format)
        .to_string()
        .replace(MONTH_LONG, &i18n.month_name(month, false))
        .replace(MONTH_SHORT, &i18n.month_name(month, true))
}

/// Format a publication date in the given timezone; unpublished documents
/// render as an empty string
pub fn format_published(
    date: Option<DateTime<Utc>>,
    tz: chrono_tz::Tz,
    format: &str,
    i18n: &I18n,
) -> String {
    date.map(|d| format_date(&d.with_timezone(&tz), format, i18n))
        .unwrap_or_default()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", MONTH_LONG),
        ("MMM", MONTH_SHORT),
        ("MM", "%m"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("ZZ", "%z"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
