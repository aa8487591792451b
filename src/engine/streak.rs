use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::utils::time::previous_day;

use super::entry::ActivityEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub current: u32,
    pub best: u32,
}

/// Days on which some completed time was tracked.
pub fn active_dates(entries: &[ActivityEntry], now: NaiveDateTime) -> BTreeSet<NaiveDate> {
    let mut minutes = BTreeMap::<NaiveDate, u64>::new();
    for entry in entries.iter().filter(|v| v.is_completed(now)) {
        *minutes.entry(entry.date()).or_default() += entry.duration_minutes as u64;
    }
    minutes
        .into_iter()
        .filter(|(_, minutes)| *minutes > 0)
        .map(|(date, _)| date)
        .collect()
}

/// Computes the longest run of consecutive active days and the run that is still going.
///
/// A run is still going when it ends today or yesterday, otherwise `current` is zero. Dates
/// after `today` only affect `best`.
pub fn streaks(active_dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> Streaks {
    let mut best = 0;
    let mut running = 0;
    let mut previous: Option<NaiveDate> = None;

    for date in active_dates {
        running = match previous {
            Some(previous) if previous.succ_opt() == Some(*date) => running + 1,
            _ => 1,
        };
        best = best.max(running);
        previous = Some(*date);
    }

    Streaks {
        current: current_streak(active_dates, today),
        best,
    }
}

fn current_streak(active_dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let anchor = if active_dates.contains(&today) {
        Some(today)
    } else {
        previous_day(today).filter(|v| active_dates.contains(v))
    };

    let Some(mut day) = anchor else {
        return 0;
    };

    let mut current = 0;
    while active_dates.contains(&day) {
        current += 1;
        match previous_day(day) {
            Some(v) => day = v,
            None => break,
        }
    }
    current
}
