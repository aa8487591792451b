use std::{cmp::Ordering, fmt::Display};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::utils::{ratio::per, time::minutes_to_hours};

use super::{
    entry::{ActivityEntry, DateWindow},
    rollup::{overall, rollup},
    streak::active_dates,
};

/// Numbers of a single window that take part in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodStats {
    pub window: DateWindow,
    pub total_minutes: u64,
    pub days_active: u32,
}

impl PeriodStats {
    pub fn collect(entries: &[ActivityEntry], window: DateWindow, now: NaiveDateTime) -> Self {
        let total_minutes = overall(&rollup(entries, window, now)).total_minutes;
        let days_active = active_dates(entries, now)
            .range(window.first_day()..=window.last_day())
            .count() as u32;
        Self {
            window,
            total_minutes,
            days_active,
        }
    }

    pub fn hours(&self) -> f64 {
        minutes_to_hours(self.total_minutes)
    }

    pub fn average_hours_per_active_day(&self) -> f64 {
        per(self.hours(), self.days_active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increased,
    Decreased,
    Unchanged,
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increased => write!(f, "▲"),
            Trend::Decreased => write!(f, "▼"),
            Trend::Unchanged => write!(f, "="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    pub current: f64,
    pub previous: f64,
    pub difference: f64,
    pub trend: Trend,
}

impl MetricDelta {
    fn new(current: f64, previous: f64, ordering: Ordering) -> Self {
        let (difference, trend) = match ordering {
            Ordering::Greater => (current - previous, Trend::Increased),
            Ordering::Less => (current - previous, Trend::Decreased),
            Ordering::Equal => (0., Trend::Unchanged),
        };
        Self {
            current,
            previous,
            difference,
            trend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub hours: MetricDelta,
    pub days_active: MetricDelta,
    pub average_hours_per_active_day: MetricDelta,
}

/// Describes how `current` changed relative to `previous`.
pub fn compare(current: &PeriodStats, previous: &PeriodStats) -> PeriodComparison {
    let current_average = current.average_hours_per_active_day();
    let previous_average = previous.average_hours_per_active_day();
    PeriodComparison {
        // Whole minutes are compared so equal totals never differ by float noise.
        hours: MetricDelta::new(
            current.hours(),
            previous.hours(),
            current.total_minutes.cmp(&previous.total_minutes),
        ),
        days_active: MetricDelta::new(
            current.days_active as f64,
            previous.days_active as f64,
            current.days_active.cmp(&previous.days_active),
        ),
        average_hours_per_active_day: MetricDelta::new(
            current_average,
            previous_average,
            compare_averages(current, previous),
        ),
    }
}

/// Orders minutes per active day without dividing, by cross-multiplying the fractions.
/// A period without active days averages zero.
fn compare_averages(current: &PeriodStats, previous: &PeriodStats) -> Ordering {
    match (current.days_active, previous.days_active) {
        (0, 0) => Ordering::Equal,
        (0, _) => 0.cmp(&previous.total_minutes),
        (_, 0) => current.total_minutes.cmp(&0),
        (current_days, previous_days) => {
            let current_scaled = current.total_minutes as u128 * previous_days as u128;
            let previous_scaled = previous.total_minutes as u128 * current_days as u128;
            current_scaled.cmp(&previous_scaled)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{compare, PeriodStats, Trend};
    use crate::engine::{
        entry::{test_entries::*, DateWindow, WorkType},
        periods::Period,
    };

    fn month(month: u32) -> DateWindow {
        Period::Month.window_containing(NaiveDate::from_ymd_opt(2025, month, 1).unwrap())
    }

    #[test]
    fn test_compare_months() {
        let now = at(2025, 4, 1, 0);
        let entries = vec![
            entry("a", at(2025, 2, 3, 9), 60, None, WorkType::Deep),
            entry("b", at(2025, 3, 3, 9), 120, None, WorkType::Deep),
            entry("c", at(2025, 3, 4, 9), 120, None, WorkType::Shallow),
            entry("d", at(2025, 3, 5, 9), 60, None, WorkType::Other),
        ];
        let current = PeriodStats::collect(&entries, month(3), now);
        let previous = PeriodStats::collect(&entries, month(2), now);
        let comparison = compare(&current, &previous);

        assert_eq!(comparison.hours.current, 5.);
        assert_eq!(comparison.hours.previous, 1.);
        assert_eq!(comparison.hours.difference, 4.);
        assert_eq!(comparison.hours.trend, Trend::Increased);
        assert_eq!(comparison.days_active.trend, Trend::Increased);
        assert_eq!(comparison.days_active.difference, 2.);

        let reversed = compare(&previous, &current);
        assert_eq!(reversed.hours.trend, Trend::Decreased);
        assert_eq!(reversed.hours.difference, -4.);
    }

    #[test]
    fn test_compare_tie() {
        let now = at(2025, 4, 1, 0);
        let entries = vec![
            entry("a", at(2025, 2, 3, 9), 90, None, WorkType::Deep),
            entry("b", at(2025, 3, 3, 9), 90, None, WorkType::Shallow),
        ];
        let comparison = compare(
            &PeriodStats::collect(&entries, month(3), now),
            &PeriodStats::collect(&entries, month(2), now),
        );
        assert_eq!(comparison.hours.trend, Trend::Unchanged);
        assert_eq!(comparison.hours.difference, 0.);
        assert_eq!(comparison.days_active.trend, Trend::Unchanged);
        assert_eq!(comparison.average_hours_per_active_day.trend, Trend::Unchanged);
    }

    #[test]
    fn test_compare_empty() {
        let now = at(2025, 4, 1, 0);
        let comparison = compare(
            &PeriodStats::collect(&[], month(3), now),
            &PeriodStats::collect(&[], month(2), now),
        );
        assert_eq!(comparison.hours.trend, Trend::Unchanged);
        assert_eq!(comparison.average_hours_per_active_day.current, 0.);
    }

    #[test]
    fn test_compare_equal_averages_over_different_days() {
        let now = at(2025, 4, 1, 0);
        let entries = vec![
            entry("a", at(2025, 2, 3, 9), 3, None, WorkType::Deep),
            entry("b", at(2025, 3, 3, 9), 3, None, WorkType::Deep),
            entry("c", at(2025, 3, 4, 9), 3, None, WorkType::Deep),
            entry("d", at(2025, 3, 5, 9), 3, None, WorkType::Deep),
        ];
        let current = PeriodStats::collect(&entries, month(3), now);
        let previous = PeriodStats::collect(&entries, month(2), now);
        let comparison = compare(&current, &previous);

        assert_eq!(comparison.hours.trend, Trend::Increased);
        assert_eq!(comparison.average_hours_per_active_day.trend, Trend::Unchanged);
        assert_eq!(comparison.average_hours_per_active_day.difference, 0.);

        let reversed = compare(&previous, &current);
        assert_eq!(reversed.average_hours_per_active_day.trend, Trend::Unchanged);
        assert_eq!(reversed.average_hours_per_active_day.difference, 0.);
    }

    #[test]
    fn test_compare_averages_against_inactive_period() {
        let now = at(2025, 4, 1, 0);
        let entries = vec![entry("a", at(2025, 3, 3, 9), 30, None, WorkType::Deep)];
        let comparison = compare(
            &PeriodStats::collect(&entries, month(3), now),
            &PeriodStats::collect(&entries, month(2), now),
        );
        assert_eq!(comparison.average_hours_per_active_day.trend, Trend::Increased);
        assert_eq!(comparison.average_hours_per_active_day.previous, 0.);
    }
}
