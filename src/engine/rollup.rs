use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{ser::SerializeMap, Serializer};

use super::entry::{ActivityEntry, CategoryId, DateWindow, EntrySource, MinuteTotals};

/// Rollup key. `None` collects uncategorized entries.
pub type CategoryKey = Option<CategoryId>;

pub type CategoryRollup = BTreeMap<CategoryKey, MinuteTotals>;

/// Entries that started inside `window` and represent time that has actually been spent.
pub fn completed_in<'a>(
    entries: &'a [ActivityEntry],
    window: DateWindow,
    now: NaiveDateTime,
) -> impl Iterator<Item = &'a ActivityEntry> + 'a {
    entries
        .iter()
        .filter(move |v| window.contains(v.start) && v.is_completed(now))
}

/// Sums durations per category over a window. Future planned blocks are ignored even when they
/// fall inside the window. Values stay in minutes, see [crate::utils::time::round_hours] for
/// presentation.
pub fn rollup(entries: &[ActivityEntry], window: DateWindow, now: NaiveDateTime) -> CategoryRollup {
    let mut map = CategoryRollup::new();
    for entry in completed_in(entries, window, now) {
        map.entry(entry.category_id.clone())
            .or_default()
            .add_entry(entry);
    }
    map
}

/// Sum over every category of a rollup.
pub fn overall(rollup: &CategoryRollup) -> MinuteTotals {
    rollup.values().fold(MinuteTotals::default(), |mut acc, v| {
        acc += *v;
        acc
    })
}

/// Label used for entries without a category wherever a rollup is shown or serialized.
pub const UNCATEGORIZED: &str = "uncategorized";

pub fn category_label(key: &CategoryKey) -> &str {
    key.as_deref().unwrap_or(UNCATEGORIZED)
}

/// JSON maps need string keys, so uncategorized totals are written under [UNCATEGORIZED].
pub fn serialize_rollup<S: Serializer>(rollup: &CategoryRollup, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(rollup.len()))?;
    for (key, totals) in rollup {
        map.serialize_entry(category_label(key), totals)?;
    }
    map.end()
}

/// Minutes of planner blocks inside the window that haven't happened yet.
pub fn planned_minutes(entries: &[ActivityEntry], window: DateWindow, now: NaiveDateTime) -> u64 {
    entries
        .iter()
        .filter(|v| v.source == EntrySource::Planned && window.contains(v.start) && v.start > now)
        .map(|v| v.duration_minutes as u64)
        .sum()
}
