//! Gregorian to Hijri conversion.
//!
//! Uses the arithmetic 30-year-cycle approximation counted from the Hijri
//! epoch. It is not an observed (moon-sighted) calendar and drifts from one
//! by a day or more; month and day are clamped instead of reported as errors.

use crate::structs::HijriDate;
use chrono::{Datelike, NaiveDate};

/// Days from 0001-01-01 (day 1) to 622-07-19, proleptic Gregorian.
/// 1 Muharram of the first Hijri year.
pub const HIJRI_EPOCH_DAYS_FROM_CE: i64 = 227_015;

/// Mean Hijri year length over a 30-year cycle.
pub const MEAN_HIJRI_YEAR_DAYS: f64 = 354.36708;

/// Leap years within each 30-year cycle (1-indexed position).
pub const LEAP_YEARS_IN_CYCLE: [i64; 11] = [2, 5, 7, 10, 13, 16, 18, 21, 24, 26, 29];

const HIJRI_MONTH_NAMES: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi al-Awwal",
    "Rabi al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

/// Returns the Hijri month name for a 1-indexed month, `None` outside 1..=12.
pub fn hijri_month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    HIJRI_MONTH_NAMES.get(index).copied()
}

fn is_leap_position(position: i64) -> bool {
    LEAP_YEARS_IN_CYCLE.contains(&position)
}

/// Position of `hijri_year` in its 30-year cycle and the days its
/// preceding whole years take up.
fn days_in_hijri_years(hijri_year: i64) -> (i64, i64) {
    let cycles = hijri_year.div_euclid(30);
    let year_in_cycle = hijri_year.rem_euclid(30);
    let leap_years_passed = LEAP_YEARS_IN_CYCLE
        .iter()
        .filter(|&&leap| year_in_cycle >= leap)
        .count() as i64;

    (
        year_in_cycle,
        hijri_year * 354 + cycles * 11 + leap_years_passed,
    )
}

/// Converts a Gregorian date to its approximate Hijri date.
///
/// Returns `None` for dates before the Hijri epoch (622-07-19).
///
/// # Example
/// ```rust
/// use chrono::NaiveDate;
/// use mosque_times::calendar::to_hijri;
///
/// let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
/// let hijri = to_hijri(date).unwrap();
/// assert_eq!((hijri.year, hijri.month, hijri.day), (1419, 9, 24));
/// assert_eq!(hijri.month_name, "Ramadan");
/// ```
pub fn to_hijri(date: NaiveDate) -> Option<HijriDate> {
    let days_since_epoch = i64::from(date.num_days_from_ce()) - HIJRI_EPOCH_DAYS_FROM_CE;
    if days_since_epoch < 0 {
        return None;
    }

    let mut hijri_year = (days_since_epoch as f64 / MEAN_HIJRI_YEAR_DAYS).floor() as i64;
    let (mut year_in_cycle, elapsed) = days_in_hijri_years(hijri_year);
    let mut days_remaining = days_since_epoch - elapsed;

    // The mean-length estimate can overshoot by one year.
    if days_remaining < 0 {
        hijri_year -= 1;
        let (corrected_year_in_cycle, elapsed) = days_in_hijri_years(hijri_year);
        year_in_cycle = corrected_year_in_cycle;
        days_remaining = days_since_epoch - elapsed;
    }

    let mut month: u32 = 1;
    let mut days_in_month: i64 = 30;
    while days_remaining >= days_in_month {
        days_remaining -= days_in_month;
        month += 1;
        if month > 12 {
            break;
        }
        days_in_month = if month % 2 == 1 { 30 } else { 29 };
        if month == 12 && is_leap_position(year_in_cycle + 1) {
            days_in_month = 30;
        }
    }

    let month = month.min(12);
    let day = u32::try_from(days_remaining + 1).unwrap_or(u32::MAX).min(30);

    Some(HijriDate {
        year: hijri_year,
        month,
        day,
        month_name: HIJRI_MONTH_NAMES[(month - 1) as usize],
    })
}

/// Converts a `YYYY-MM-DD` string; anything unparseable yields `None`.
pub fn hijri_from_str(date: &str) -> Option<HijriDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .and_then(to_hijri)
}
