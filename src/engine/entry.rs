use std::{fmt::Display, ops::AddAssign, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::utils::time::{end_of_day, start_of_day};

pub type CategoryId = Arc<str>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    Deep,
    Shallow,
    #[default]
    Other,
}

impl Display for WorkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkType::Deep => write!(f, "deep"),
            WorkType::Shallow => write!(f, "shallow"),
            WorkType::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Confirmed session that has been recorded.
    Logged,
    /// Planner block that hasn't been confirmed yet.
    Planned,
}

/// The unit every aggregation operates on. Produced by [normalize](super::normalize::normalize)
/// out of stored records and planner drafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub id: Arc<str>,
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    pub category_id: Option<CategoryId>,
    pub work_type: WorkType,
    pub source: EntrySource,
}

impl ActivityEntry {
    /// Whether the entry counts as time that has actually been spent. Planned blocks only count
    /// once their start has passed.
    pub fn is_completed(&self, now: NaiveDateTime) -> bool {
        self.source == EntrySource::Logged || self.start <= now
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

/// Minute sums of a group of entries. `other` work only shows up in `total_minutes`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MinuteTotals {
    pub total_minutes: u64,
    pub deep_minutes: u64,
    pub shallow_minutes: u64,
}

impl MinuteTotals {
    pub fn add_entry(&mut self, entry: &ActivityEntry) {
        let minutes = entry.duration_minutes as u64;
        self.total_minutes += minutes;
        match entry.work_type {
            WorkType::Deep => self.deep_minutes += minutes,
            WorkType::Shallow => self.shallow_minutes += minutes,
            WorkType::Other => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_minutes == 0
    }
}

impl AddAssign for MinuteTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.total_minutes += rhs.total_minutes;
        self.deep_minutes += rhs.deep_minutes;
        self.shallow_minutes += rhs.shallow_minutes;
    }
}

/// Closed range of local time. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Covers whole days from `first` 00:00:00 to `last` 23:59:59.
    pub fn from_days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: start_of_day(first),
            end: end_of_day(last),
        }
    }

    pub fn contains(&self, moment: NaiveDateTime) -> bool {
        self.start <= moment && moment <= self.end
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date()
    }
}
