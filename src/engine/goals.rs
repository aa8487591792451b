use std::collections::HashMap;

use serde::Serialize;
use tracing::trace;

use crate::{
    storage::entities::{Category, DailyLog, TrackingMode, WeeklyGoal},
    utils::{
        ratio::{per, Ratio},
        time::minutes_to_hours,
    },
};

use super::{entry::CategoryId, rollup::CategoryRollup};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub category_id: CategoryId,
    pub target_hours: f64,
    pub current_hours: f64,
    pub deep_hours: f64,
    pub shallow_hours: f64,
    /// Hours per remaining day required to reach the target. Zero once the target is met or no
    /// days are left.
    pub pace_needed_per_day: f64,
    /// Progress towards the target as a percentage.
    pub completion: Ratio,
}

impl GoalProgress {
    pub fn is_met(&self) -> bool {
        self.current_hours >= self.target_hours
    }
}

/// Compares a week's rollup with the configured goals.
///
/// Only enabled goals with a positive target are reported, and only for top-level categories
/// (goals referring to categories missing from `categories` are treated as top-level).
/// Categories tracked as [TrackingMode::SelfReported] take their progress from the
/// `social_media_minutes` of `daily_logs` instead of the rollup.
pub fn weekly_progress(
    goals: &[WeeklyGoal],
    categories: &[Category],
    rollup: &CategoryRollup,
    daily_logs: &[DailyLog],
    days_remaining_in_week: u32,
) -> Vec<GoalProgress> {
    let categories = categories
        .iter()
        .map(|v| (v.id.clone(), v))
        .collect::<HashMap<_, _>>();

    let self_reported_minutes: u64 = daily_logs
        .iter()
        .map(|v| v.social_media_minutes.unwrap_or(0).max(0) as u64)
        .sum();

    goals
        .iter()
        .filter(|goal| goal.enabled && goal.target_hours > 0.)
        .filter(|goal| {
            categories
                .get(&goal.category_id)
                .map_or(true, |category| category.is_top_level())
        })
        .map(|goal| {
            let totals = rollup
                .get(&Some(goal.category_id.clone()))
                .copied()
                .unwrap_or_default();

            let tracking_mode = categories
                .get(&goal.category_id)
                .map(|v| v.tracking_mode)
                .unwrap_or_default();

            let current_minutes = match tracking_mode {
                TrackingMode::Timed => totals.total_minutes,
                TrackingMode::SelfReported => self_reported_minutes,
            };
            let current_hours = minutes_to_hours(current_minutes);

            trace!(
                "Goal {} {tracking_mode:?} current {current_hours} target {}",
                goal.category_id,
                goal.target_hours
            );

            GoalProgress {
                category_id: goal.category_id.clone(),
                target_hours: goal.target_hours,
                current_hours,
                deep_hours: minutes_to_hours(totals.deep_minutes),
                shallow_hours: minutes_to_hours(totals.shallow_minutes),
                pace_needed_per_day: per(
                    (goal.target_hours - current_hours).max(0.),
                    days_remaining_in_week,
                ),
                completion: Ratio::of(current_hours, goal.target_hours).as_percentage(),
            }
        })
        .collect()
}
