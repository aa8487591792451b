use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use super::entry::ActivityEntry;

/// Upper bound of columns in a heatmap. A leap year starting on Saturday would need a 54th
/// column for Dec 31, which gets cut off.
pub const MAX_WEEKS: usize = 53;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapLevel {
    /// Padding day that belongs to the previous or next year.
    Outside,
    None,
    /// More than zero hours.
    Light,
    /// At least 2 hours.
    Moderate,
    /// At least 4 hours.
    High,
    /// At least 6 hours.
    Intense,
}

impl HeatmapLevel {
    pub fn from_minutes(minutes: u64) -> Self {
        match minutes {
            0 => HeatmapLevel::None,
            m if m >= 6 * 60 => HeatmapLevel::Intense,
            m if m >= 4 * 60 => HeatmapLevel::High,
            m if m >= 2 * 60 => HeatmapLevel::Moderate,
            _ => HeatmapLevel::Light,
        }
    }

    /// Numeric level 0-4, `None` for days outside of the year.
    pub fn level(&self) -> Option<u8> {
        match self {
            HeatmapLevel::Outside => None,
            HeatmapLevel::None => Some(0),
            HeatmapLevel::Light => Some(1),
            HeatmapLevel::Moderate => Some(2),
            HeatmapLevel::High => Some(3),
            HeatmapLevel::Intense => Some(4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub level: HeatmapLevel,
}

/// Columns of 7 days (Sunday first) covering `year`.
pub type HeatmapGrid = Vec<Vec<HeatmapCell>>;

/// Buckets completed time of `year` into a calendar grid. The grid starts on the Sunday on or
/// before Jan 1 and runs in whole weeks through Dec 31.
pub fn heatmap(entries: &[ActivityEntry], year: i32, now: NaiveDateTime) -> HeatmapGrid {
    let (Some(first), Some(last)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return vec![];
    };

    let mut minutes = HashMap::<NaiveDate, u64>::new();
    for entry in entries
        .iter()
        .filter(|v| v.date().year() == year && v.is_completed(now))
    {
        *minutes.entry(entry.date()).or_default() += entry.duration_minutes as u64;
    }

    let offset = first.weekday().num_days_from_sunday() as u64;
    let Some(grid_start) = first.checked_sub_days(Days::new(offset)) else {
        return vec![];
    };

    let mut weeks = Vec::with_capacity(MAX_WEEKS);
    let mut week_start = grid_start;
    while week_start <= last && weeks.len() < MAX_WEEKS {
        let week = week_start
            .iter_days()
            .take(7)
            .map(|date| HeatmapCell {
                date,
                level: if date.year() == year {
                    HeatmapLevel::from_minutes(minutes.get(&date).copied().unwrap_or(0))
                } else {
                    HeatmapLevel::Outside
                },
            })
            .collect::<Vec<_>>();
        weeks.push(week);
        let Some(next) = week_start.checked_add_days(Days::new(7)) else {
            break;
        };
        week_start = next;
    }

    debug!("Heatmap for {year} has {} weeks", weeks.len());
    weeks
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Weekday};

    use super::{heatmap, HeatmapLevel};
    use crate::engine::entry::{test_entries::*, WorkType};

    fn cell_level(
        grid: &[Vec<super::HeatmapCell>],
        date: NaiveDate,
    ) -> Option<HeatmapLevel> {
        grid.iter()
            .flatten()
            .find(|v| v.date == date)
            .map(|v| v.level)
    }

    #[test]
    fn test_heatmap_levels() {
        let now = at(2026, 1, 1, 0);
        let entries = vec![
            entry("a", at(2025, 3, 10, 9), 150, None, WorkType::Deep),
            entry("b", at(2025, 3, 11, 9), 30, None, WorkType::Other),
            entry("c", at(2025, 3, 11, 12), 30, None, WorkType::Shallow),
            entry("d", at(2025, 3, 12, 9), 240, None, WorkType::Deep),
            entry("e", at(2025, 3, 13, 9), 400, None, WorkType::Deep),
            entry("f", at(2025, 3, 14, 9), 0, None, WorkType::Deep),
        ];
        let grid = heatmap(&entries, 2025, now);
        let date = |m, d| NaiveDate::from_ymd_opt(2025, m, d).unwrap();

        assert_eq!(cell_level(&grid, date(3, 10)), Some(HeatmapLevel::Moderate));
        assert_eq!(cell_level(&grid, date(3, 10)).unwrap().level(), Some(2));
        assert_eq!(cell_level(&grid, date(3, 11)), Some(HeatmapLevel::Light));
        assert_eq!(cell_level(&grid, date(3, 12)), Some(HeatmapLevel::High));
        assert_eq!(cell_level(&grid, date(3, 13)), Some(HeatmapLevel::Intense));
        assert_eq!(cell_level(&grid, date(3, 14)), Some(HeatmapLevel::None));
        assert_eq!(cell_level(&grid, date(3, 14)).unwrap().level(), Some(0));

        // 2025 starts on a Wednesday, so the grid begins with padding from 2024
        let padding = NaiveDate::from_ymd_opt(2024, 12, 29).unwrap();
        assert_eq!(grid[0][0].date, padding);
        assert_eq!(cell_level(&grid, padding), Some(HeatmapLevel::Outside));
        assert_eq!(HeatmapLevel::Outside.level(), None);
    }

    #[test]
    fn test_heatmap_ignores_future_planned_and_other_years() {
        let now = at(2025, 3, 10, 12);
        let entries = vec![
            planned(entry("a", at(2025, 3, 11, 9), 400, None, WorkType::Deep)),
            entry("b", at(2024, 12, 30, 9), 400, None, WorkType::Deep),
        ];
        let grid = heatmap(&entries, 2025, now);
        let future = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let previous_year = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(cell_level(&grid, future), Some(HeatmapLevel::None));
        assert_eq!(cell_level(&grid, previous_year), Some(HeatmapLevel::Outside));
    }

    #[test]
    fn test_heatmap_grid_size() {
        let now = at(2030, 1, 1, 0);
        for year in 2015..2030 {
            let grid = heatmap(&[], year, now);
            assert!(grid.len() == 52 || grid.len() == 53, "{year} {}", grid.len());
            assert!(grid.iter().all(|week| week.len() == 7));
            assert_eq!(grid.iter().flatten().count() % 7, 0);
            assert_eq!(grid[0][0].date.weekday(), Weekday::Sun);
            assert_eq!(heatmap(&[], year, now), grid);
        }
    }
}
