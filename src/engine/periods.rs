use std::fmt::Display;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::Serialize;

use crate::utils::{
    ratio::Ratio,
    time::{days_between, previous_day, week_start},
};

use super::{
    entry::{ActivityEntry, DateWindow, MinuteTotals},
    rollup::{completed_in, overall, planned_minutes, rollup, serialize_rollup, CategoryRollup},
    streak::active_dates,
};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Day => write!(f, "day"),
            Period::Week => write!(f, "week"),
            Period::Month => write!(f, "month"),
            Period::Year => write!(f, "year"),
        }
    }
}

impl Period {
    /// First day of the period containing `date`. Weeks start on Monday.
    pub fn start_of(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => week_start(date),
            Period::Month => date.with_day(1).unwrap_or(date),
            Period::Year => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// First day of the period that follows the one starting at `start`.
    pub fn next_start(&self, start: NaiveDate) -> Option<NaiveDate> {
        let start = self.start_of(start);
        match self {
            Period::Day => start.succ_opt(),
            Period::Week => start.checked_add_days(chrono::Days::new(7)),
            Period::Month => start.checked_add_months(Months::new(1)),
            Period::Year => start.checked_add_months(Months::new(12)),
        }
    }

    pub fn window_containing(&self, date: NaiveDate) -> DateWindow {
        let first = self.start_of(date);
        let last = self
            .next_start(first)
            .and_then(previous_day)
            .unwrap_or(first);
        DateWindow::from_days(first, last)
    }

    /// The period right before the one `window` starts in.
    pub fn previous_window(&self, window: DateWindow) -> DateWindow {
        match previous_day(self.start_of(window.first_day())) {
            Some(day) => self.window_containing(day),
            None => window,
        }
    }

    /// Granularity used when breaking the period down, e.g. days of a week.
    pub fn bucket(&self) -> Period {
        match self {
            Period::Day | Period::Week | Period::Month => Period::Day,
            Period::Year => Period::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub start: NaiveDate,
    pub totals: MinuteTotals,
}

/// Splits `window` into consecutive buckets of `granularity`, empty buckets included.
pub fn breakdown(
    entries: &[ActivityEntry],
    window: DateWindow,
    granularity: Period,
    now: NaiveDateTime,
) -> Vec<Bucket> {
    let mut buckets = vec![];
    let mut current = Some(granularity.start_of(window.first_day()));
    while let Some(start) = current.filter(|v| *v <= window.last_day()) {
        buckets.push(Bucket {
            start,
            totals: MinuteTotals::default(),
        });
        current = granularity.next_start(start);
    }

    for entry in completed_in(entries, window, now) {
        let bucket_start = granularity.start_of(entry.date());
        if let Ok(index) = buckets.binary_search_by(|v| v.start.cmp(&bucket_start)) {
            buckets[index].totals.add_entry(entry);
        }
    }
    buckets
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub window: DateWindow,
    pub totals: MinuteTotals,
    /// Future planner blocks inside the window.
    pub planned_minutes: u64,
    pub days_active: u32,
    pub days_in_window: u32,
    pub average_minutes_per_active_day: f64,
    pub deep_shallow_ratio: Ratio,
    #[serde(serialize_with = "serialize_rollup")]
    pub categories: CategoryRollup,
}

/// Headline numbers of a day, week, month or year view.
pub fn summarize(entries: &[ActivityEntry], window: DateWindow, now: NaiveDateTime) -> PeriodSummary {
    let categories = rollup(entries, window, now);
    let totals = overall(&categories);
    let days_active = active_dates(entries, now)
        .range(window.first_day()..=window.last_day())
        .count() as u32;

    PeriodSummary {
        window,
        totals,
        planned_minutes: planned_minutes(entries, window, now),
        days_active,
        days_in_window: days_between(window.first_day(), window.last_day()).count() as u32,
        average_minutes_per_active_day: Ratio::of_minutes(totals.total_minutes, days_active as u64)
            .finite()
            .unwrap_or(0.),
        deep_shallow_ratio: Ratio::of_minutes(totals.deep_minutes, totals.shallow_minutes),
        categories,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{breakdown, summarize, Period};
    use crate::{
        engine::entry::{test_entries::*, DateWindow, WorkType},
        utils::ratio::Ratio,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_period_windows() {
        let thursday = date(2025, 3, 13);
        assert_eq!(
            Period::Week.window_containing(thursday),
            DateWindow::from_days(date(2025, 3, 10), date(2025, 3, 16))
        );
        assert_eq!(
            Period::Month.window_containing(date(2024, 2, 10)),
            DateWindow::from_days(date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            Period::Year.window_containing(thursday),
            DateWindow::from_days(date(2025, 1, 1), date(2025, 12, 31))
        );
        assert_eq!(
            Period::Day.window_containing(thursday),
            DateWindow::from_days(thursday, thursday)
        );
    }

    #[test]
    fn test_previous_windows() {
        let march = Period::Month.window_containing(date(2025, 3, 13));
        assert_eq!(
            Period::Month.previous_window(march),
            DateWindow::from_days(date(2025, 2, 1), date(2025, 2, 28))
        );
        let week = Period::Week.window_containing(date(2025, 1, 1));
        assert_eq!(
            Period::Week.previous_window(week),
            DateWindow::from_days(date(2024, 12, 23), date(2024, 12, 29))
        );
    }

    #[test]
    fn test_breakdown_includes_empty_buckets() {
        let now = at(2025, 12, 31, 0);
        let entries = vec![
            entry("a", at(2025, 3, 10, 9), 60, None, WorkType::Deep),
            entry("b", at(2025, 3, 12, 9), 30, None, WorkType::Shallow),
            entry("c", at(2025, 3, 12, 10), 30, None, WorkType::Deep),
        ];
        let week = Period::Week.window_containing(date(2025, 3, 12));
        let days = breakdown(&entries, week, Period::Week.bucket(), now);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].totals.total_minutes, 60);
        assert!(days[1].totals.is_empty());
        assert_eq!(days[2].totals.total_minutes, 60);
        assert_eq!(days[2].totals.shallow_minutes, 30);

        let year = Period::Year.window_containing(date(2025, 3, 12));
        let months = breakdown(&entries, year, Period::Year.bucket(), now);
        assert_eq!(months.len(), 12);
        assert_eq!(months[2].start, date(2025, 3, 1));
        assert_eq!(months[2].totals.total_minutes, 120);
    }

    #[test]
    fn test_summary() {
        let now = at(2025, 3, 12, 12);
        let entries = vec![
            entry("a", at(2025, 3, 10, 9), 120, Some("writing"), WorkType::Deep),
            entry("b", at(2025, 3, 12, 9), 60, None, WorkType::Other),
            planned(entry("c", at(2025, 3, 14, 9), 90, None, WorkType::Deep)),
        ];
        let week = Period::Week.window_containing(date(2025, 3, 12));
        let summary = summarize(&entries, week, now);
        assert_eq!(summary.totals.total_minutes, 180);
        assert_eq!(summary.planned_minutes, 90);
        assert_eq!(summary.days_active, 2);
        assert_eq!(summary.days_in_window, 7);
        assert_eq!(summary.average_minutes_per_active_day, 90.);
        assert_eq!(summary.deep_shallow_ratio, Ratio::Infinite);
        assert_eq!(summary.categories.len(), 2);
    }

    #[test]
    fn test_summary_empty() {
        let week = Period::Week.window_containing(date(2025, 3, 12));
        let summary = summarize(&[], week, at(2025, 3, 12, 12));
        assert_eq!(summary.totals.total_minutes, 0);
        assert_eq!(summary.days_active, 0);
        assert_eq!(summary.average_minutes_per_active_day, 0.);
        assert_eq!(summary.deep_shallow_ratio, Ratio::Finite(0.));
    }
}
