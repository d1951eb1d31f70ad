//! Parser for the word-count / update-date line under a chapter title.
//!
//! The line reads `本章字数：<n>字更新时间：<date>`, where the date is
//! `YYYY-MM-DD`, or `MM-DD` when the update happened in the current year.

use crate::novel::ChapterFooterInfo;
use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Anchored footer pattern. Digit classes are ASCII-only.
static FOOTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^本章字数：(?P<words>[0-9]+)字更新时间：(?:(?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})|(?P<short_month>[0-9]{2})-(?P<short_day>[0-9]{2}))$",
    )
    .expect("Invalid FOOTER_REGEX")
});

/// Parses a footer line, inferring the current local year for `MM-DD` dates.
///
/// Returns `None` when the line does not have the expected shape.
pub fn parse_chapter_footer(line: &str) -> Option<ChapterFooterInfo> {
    parse_chapter_footer_in_year(line, Local::now().year())
}

/// Parses a footer line, using `current_year` for dates without a year.
pub fn parse_chapter_footer_in_year(line: &str, current_year: i32) -> Option<ChapterFooterInfo> {
    let caps = FOOTER_REGEX.captures(line)?;

    let words = caps["words"].parse::<u64>().ok()?;

    let (year, month, day) = match caps.name("year") {
        Some(year) => (year.as_str().parse::<i32>().ok()?, &caps["month"], &caps["day"]),
        None => (current_year, &caps["short_month"], &caps["short_day"]),
    };
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;

    let date = rollover_date(year, month, day)?;

    Some(ChapterFooterInfo {
        words,
        updated_at: local_midnight(date),
    })
}

/// Builds a calendar date, letting out-of-range months and days roll over
/// into neighbouring months (`02-30` becomes March 2nd, `00-10` is December
/// 10th of the previous year).
fn rollover_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;

    let with_month = match month {
        0 => start.checked_sub_months(Months::new(1))?,
        m => start.checked_add_months(Months::new(m - 1))?,
    };

    match day {
        0 => with_month.checked_sub_days(Days::new(1)),
        d => with_month.checked_add_days(Days::new(u64::from(d - 1))),
    }
}

/// Converts local midnight of `date` to UTC.
fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let midnight: NaiveDateTime = date.and_time(chrono::NaiveTime::MIN);

    // Midnight can fall inside a DST gap; step forward until it exists.
    let mut candidate = midnight;
    for _ in 0..=24 * 4 {
        if let Some(local) = candidate.and_local_timezone(Local).earliest() {
            return local.with_timezone(&Utc);
        }
        candidate += TimeDelta::minutes(15);
    }

    midnight.and_utc()
}
