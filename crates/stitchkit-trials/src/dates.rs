//! Free-text trial and publication dates to ISO form

use chrono::{Month, NaiveDate};

/// Month number for a full or three-letter English month name.
pub fn month_number(name: &str) -> Option<u32> {
    name.trim_end_matches('.').parse::<Month>().ok().map(|m| m.number_from_month())
}

/// `"March 15, 2020"` -> `2020-03-15`, `"March 2020"` -> `2020-03-01`,
/// `"2020"` -> `2020-12-01`.
///
/// A year alone is taken as its last month. Unknown months and impossible
/// days give `None`.
pub fn normalize_date(text: &str) -> Option<String> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let year: i32 = parts.last()?.parse().ok()?;
    let (month, day) = match parts.len() {
        1 => (12, 1),
        2 => (month_number(parts[0])?, 1),
        _ => (
            month_number(parts[0])?,
            parts[1].trim_end_matches(',').parse().ok()?,
        ),
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.format("%Y-%m-%d").to_string())
}
