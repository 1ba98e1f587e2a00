//! Portuguese date/time extraction from free-form transcripts.
//!
//! Pure and deterministic: no I/O, no state, safe to call concurrently and
//! repeatedly on the same input. The vocabulary is fixed — day + Portuguese
//! month name (optional year) for the date, and `<hour>[:|h|horas][<minutes>]`
//! for the time. Anything outside that vocabulary yields `None`.

use std::sync::OnceLock;

use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use regex::Regex;

use crate::domain::ExtractedSchedule;

/// Month used when a date phrase carries a month name outside the known
/// table. Unreachable with the current fixed vocabulary, but if the pattern
/// is ever widened, unknown names fall back to January rather than failing.
pub const FALLBACK_MONTH: u32 = 1;

/// `<day 1-2 digits> de <month-name> [de] [<year 4 digits>]`
fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(\d{1,2})\s+de\s+(janeiro|fevereiro|março|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)(?:\s+(?:de\s+)?(\d{4}))?\b",
        )
        .expect("date pattern is valid")
    })
}

/// `<hour 1-2 digits> [(":" | "h" | "horas")] [<minute 2 digits>]`
fn time_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})(?::|h|\s*horas?)?\s*(\d{2})?\b").expect("time pattern is valid")
    })
}

/// Map a matched month name to its number.
pub fn month_number(name: &str) -> u32 {
    match name.to_lowercase().as_str() {
        "janeiro" => 1,
        "fevereiro" => 2,
        "março" => 3,
        "abril" => 4,
        "maio" => 5,
        "junho" => 6,
        "julho" => 7,
        "agosto" => 8,
        "setembro" => 9,
        "outubro" => 10,
        "novembro" => 11,
        "dezembro" => 12,
        _ => FALLBACK_MONTH,
    }
}

/// Extract a schedule from transcript text, defaulting an absent year to the
/// current calendar year.
pub fn extract(text: &str) -> Option<ExtractedSchedule> {
    extract_with_year(text, Local::now().year())
}

/// Extract a schedule from transcript text with an explicit default year.
///
/// The first date match and the first time match win independently; the only
/// pairing rule is that a time match overlapping the date phrase is skipped,
/// so the day or year digits of "10 de maio de 2025" are never read as an
/// hour. Returns `None` when either pattern is absent or the combination is
/// not a valid calendar date/time.
pub fn extract_with_year(text: &str, default_year: i32) -> Option<ExtractedSchedule> {
    let date = date_pattern().captures(text)?;
    let date_span = date.get(0).expect("capture 0 always present").range();

    let day: u32 = date.get(1)?.as_str().parse().ok()?;
    let month = month_number(date.get(2)?.as_str());
    let year: i32 = match date.get(3) {
        Some(y) => y.as_str().parse().ok()?,
        None => default_year,
    };

    let time = time_pattern()
        .captures_iter(text)
        .find(|c| {
            let span = c.get(0).expect("capture 0 always present").range();
            span.end <= date_span.start || span.start >= date_span.end
        })?;

    let hour: u32 = time.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match time.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };

    let start = NaiveDate::from_ymd_opt(year, month, day)?
        .and_time(NaiveTime::from_hms_opt(hour, minute, 0)?);

    Some(ExtractedSchedule::from_start(start))
}
