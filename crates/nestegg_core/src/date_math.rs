//! Calendar helpers for the monthly simulation clock.
//!
//! The household loop steps one calendar month at a time and measures ages in
//! fractional years of 365.25 days. Day differences go through Rata Die
//! numbering so no `jiff::Span` is built inside the hot loop.

use jiff::civil::Date;

/// Days in a mean Julian year, the unit used for every age and tenure.
pub const DAYS_PER_YEAR: f64 = 365.25;

#[inline]
pub fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

#[inline]
pub fn days_in_month(year: i16, month: i8) -> i8 {
    const DAYS: [i8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[(month - 1) as usize]
    }
}

/// Convert a civil date to a Rata Die day number (days since 0001-01-01).
///
/// Uses the proleptic Gregorian calendar algorithm from Baum (2017).
/// This is an O(1) operation with no branches beyond the month adjustment.
#[inline]
fn rata_die(d: Date) -> i32 {
    let y = d.year() as i32;
    let m = d.month() as i32;
    let day = d.day() as i32;

    // Shift March = month 1 so Feb (end of "year") is month 12
    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// Compute the number of days between two dates (d2 - d1).
///
/// Positive when `d2 > d1`. This replaces `(d2 - d1).get_days()` which
/// creates an intermediate `jiff::Span` and calls the expensive `resign()`
/// normalisation path.
#[inline]
pub fn fast_days_between(d1: Date, d2: Date) -> i32 {
    rata_die(d2) - rata_die(d1)
}

/// Add `n` days to a date without going through `jiff::Span`.
///
/// Converts to Rata Die, adds, then converts back, O(1) with no
/// `Span` allocation.
#[inline]
pub fn add_days(d: Date, n: i32) -> Date {
    rd_to_date(rata_die(d) + n)
}

/// Convert a Rata Die day number back to a `jiff::civil::Date`.
///
/// Inverse of `rata_die()`, using the same proleptic Gregorian algorithm.
#[inline]
fn rd_to_date(rd: i32) -> Date {
    // Shift so day 0 = March 1, year 0
    let z = rd + 306;
    let h = 100 * z - 25;
    let a = h / 3_652_425;
    let b = a - a / 4;
    let y = (100 * b + h) / 36_525;
    let c = b + z - 365 * y - y / 4;
    let m = (5 * c + 456) / 153;
    let day = c - (153 * m - 457) / 5;

    let (year, month) = if m > 12 { (y + 1, m - 12) } else { (y, m) };

    jiff::civil::date(year as i16, month as i8, day as i8)
}

/// Fractional years between two dates (`to - from`), negative when `to`
/// precedes `from`.
#[inline]
pub fn years_between(from: Date, to: Date) -> f64 {
    f64::from(fast_days_between(from, to)) / DAYS_PER_YEAR
}

/// Whole months between two dates, rounded to the nearest month.
#[inline]
pub fn months_between(from: Date, to: Date) -> i32 {
    (12.0 * years_between(from, to)).round() as i32
}

/// Shift a date by whole months, clamping the day to the target month's length.
pub fn add_months(d: Date, months: i32) -> Date {
    let total = i32::from(d.year()) * 12 + i32::from(d.month()) - 1 + months;
    let year = total.div_euclid(12) as i16;
    let month = (total.rem_euclid(12) + 1) as i8;
    let day = d.day().min(days_in_month(year, month));
    jiff::civil::date(year, month, day)
}

#[inline]
pub fn add_years(d: Date, years: i32) -> Date {
    add_months(d, years * 12)
}

/// Whole years by calendar, then the fraction as `DAYS_PER_YEAR` days.
pub fn add_fractional_years(d: Date, years: f64) -> Date {
    let whole = years.trunc();
    let days = (DAYS_PER_YEAR * (years - whole)) as i32;
    add_days(add_years(d, whole as i32), days)
}

#[inline]
pub fn start_of_month(d: Date) -> Date {
    d.first_of_month()
}

#[inline]
pub fn end_of_month(d: Date) -> Date {
    d.last_of_month()
}

#[inline]
pub fn start_of_year(d: Date) -> Date {
    jiff::civil::date(d.year(), 1, 1)
}

#[inline]
pub fn end_of_year(d: Date) -> Date {
    jiff::civil::date(d.year(), 12, 31)
}

/// Parse a `YYYY-MM-DD` string, returning `None` for anything jiff rejects.
pub fn parse_date(s: &str) -> Option<Date> {
    s.trim().parse::<Date>().ok()
}
