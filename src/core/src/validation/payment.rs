//! Payment form checks: card expiry month and year, and the cross-field
//! expiry date.
//!
//! Years are entered as two digits and read as `20YY`. A card expires at the
//! start of its expiry month.

use crate::value::FieldValue;
use chrono::{Datelike, NaiveDate};

/// Message reported against the month field when month and year together
/// name a past date.
pub const EXPIRY_MESSAGE: &str = "Invalid date.";

fn full_year(year: &str) -> Option<i32> {
    let year = year.trim();
    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    format!("20{}", year).parse().ok()
}

fn month_number(month: &str) -> Option<u32> {
    month.trim().parse::<u32>().ok().filter(|m| (1..=12).contains(m))
}

pub fn card_month_valid(month: &str) -> bool {
    month_number(month).is_some()
}

/// A two-digit year is valid from the current year on.
pub fn card_year_valid(year: &str, today: NaiveDate) -> bool {
    full_year(year).is_some_and(|y| y >= today.year())
}

/// Whether a card with this month and two-digit year is still usable.
pub fn card_expiry_valid(month: &str, year: &str, today: NaiveDate) -> bool {
    let (Some(month), Some(year)) = (month_number(month), full_year(year)) else {
        return false;
    };
    NaiveDate::from_ymd_opt(year, month, 1).is_some_and(|expiry| expiry > today)
}

/// The expiry message for a month/year pair, or `None` when the pair is
/// acceptable. Nothing is reported until both values are present.
///
/// ```rust
/// use chrono::NaiveDate;
/// use formkit_core::validation::card_expiry_failure;
/// use formkit_core::FieldValue;
///
/// let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
/// let month = FieldValue::from("05");
/// assert_eq!(card_expiry_failure(&month, &"25".into(), today).as_deref(), Some("Invalid date."));
/// assert!(card_expiry_failure(&month, &"26".into(), today).is_none());
/// assert!(card_expiry_failure(&month, &"".into(), today).is_none());
/// ```
pub fn card_expiry_failure(
    month: &FieldValue,
    year: &FieldValue,
    today: NaiveDate,
) -> Option<String> {
    if month.is_empty(true) || year.is_empty(true) {
        return None;
    }
    (!card_expiry_valid(&month.as_text(), &year.as_text(), today))
        .then(|| EXPIRY_MESSAGE.to_string())
}
