//! Date ranges and bucket labels for the dashboard series.

use time::{Date, Duration, Month, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

/// The Monday to Sunday week containing `anchor_date`.
pub fn week_bounds(anchor_date: Date) -> DateRange {
    let start = monday_of(anchor_date);
    let end = start + Duration::days(6);

    DateRange { start, end }
}

/// The calendar month containing `anchor_date`.
pub fn month_bounds(anchor_date: Date) -> DateRange {
    let start = anchor_date - Duration::days(anchor_date.day() as i64 - 1);
    let last_day = last_day_of_month(anchor_date.year(), anchor_date.month());
    let end = start + Duration::days(last_day as i64 - 1);

    DateRange { start, end }
}

/// The calendar year containing `anchor_date`.
pub fn year_bounds(anchor_date: Date) -> DateRange {
    let start = anchor_date - Duration::days(anchor_date.ordinal() as i64 - 1);
    let length = if is_leap_year(anchor_date.year()) { 366 } else { 365 };
    let end = start + Duration::days(length - 1);

    DateRange { start, end }
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn monday_of(date: Date) -> Date {
    date - Duration::days(date.weekday().number_days_from_monday() as i64)
}

/// The one-based number of the Monday to Sunday week that `date` falls in,
/// counting the week holding `month_start` as week 1.
///
/// Counting from Mondays keeps the number right when the month starts in the
/// last ISO week of the previous year.
pub fn week_of_month(date: Date, month_start: Date) -> i64 {
    (monday_of(date) - monday_of(month_start)).whole_days() / 7 + 1
}

pub fn weekday_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

pub fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
