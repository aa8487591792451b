use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::engine::entry::{CategoryId, WorkType};

/// A stored time-tracking row. Kept close to what the store hands out, so durations and
/// category references are not trusted yet. [normalize](crate::engine::normalize::normalize)
/// is responsible for repairing them.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct TimeEntryEntity {
    pub id: Arc<str>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub work_type: WorkType,
    #[serde(default)]
    pub category_id: Option<String>,
}

/// A block drafted in the weekly planner. Once a block is confirmed it is also stored as a
/// [TimeEntryEntity] and `is_logged` is set, so the draft must not be counted again.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct DraftBlockEntity {
    pub id: Arc<str>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub work_type: WorkType,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub is_logged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    /// Progress comes from logged sessions.
    #[default]
    Timed,
    /// Progress comes from screen time reported in daily logs.
    SelfReported,
}

impl TrackingMode {
    /// Older data has no tracking mode. Such categories were treated as self-reported
    /// whenever their name mentioned scrolling or social media.
    pub fn infer_from_name(name: &str) -> TrackingMode {
        let name = name.to_lowercase();
        if ["scroll", "redes", "social"]
            .iter()
            .any(|marker| name.contains(marker))
        {
            TrackingMode::SelfReported
        } else {
            TrackingMode::Timed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub tracking_mode: TrackingMode,
}

impl Category {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyGoal {
    pub category_id: CategoryId,
    pub target_hours: f64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLog {
    pub log_date: NaiveDate,
    #[serde(default)]
    pub social_media_minutes: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}
