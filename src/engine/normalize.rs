use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::trace;

use crate::storage::entities::{DraftBlockEntity, TimeEntryEntity};

use super::entry::{ActivityEntry, CategoryId, EntrySource};

/// Merges stored sessions and planner drafts into one list ordered by start time.
/// Drafts that were already confirmed are skipped, nothing else is deduplicated.
pub fn normalize(
    logged: Vec<TimeEntryEntity>,
    drafts: Vec<DraftBlockEntity>,
) -> Vec<ActivityEntry> {
    let mut entries = Vec::with_capacity(logged.len() + drafts.len());

    entries.extend(logged.into_iter().map(|record| ActivityEntry {
        id: record.id,
        start: NaiveDateTime::new(record.date, record.time),
        duration_minutes: clamp_duration(record.duration_minutes),
        category_id: clean_category(record.category_id),
        work_type: record.work_type,
        source: EntrySource::Logged,
    }));

    let mut skipped = 0usize;
    entries.extend(drafts.into_iter().filter_map(|block| {
        if block.is_logged {
            skipped += 1;
            return None;
        }
        Some(ActivityEntry {
            id: block.id,
            start: NaiveDateTime::new(block.date, block.start_time),
            duration_minutes: clamp_duration(block.duration_minutes),
            category_id: clean_category(block.category_id),
            work_type: block.work_type,
            source: EntrySource::Planned,
        })
    }));

    trace!("Normalized {} entries, skipped {skipped} logged drafts", entries.len());

    entries.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    entries
}

fn clamp_duration(minutes: Option<i64>) -> u32 {
    minutes
        .unwrap_or(0)
        .clamp(0, u32::MAX as i64) as u32
}

fn clean_category(category: Option<String>) -> Option<CategoryId> {
    category
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(Arc::from)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::normalize;
    use crate::{
        engine::entry::{EntrySource, WorkType},
        storage::entities::{DraftBlockEntity, TimeEntryEntity},
    };

    fn record(id: &str, hour: u32, minutes: Option<i64>, category: Option<&str>) -> TimeEntryEntity {
        TimeEntryEntity {
            id: id.into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            duration_minutes: minutes,
            work_type: WorkType::Deep,
            category_id: category.map(String::from),
        }
    }

    fn draft(id: &str, hour: u32, is_logged: bool) -> DraftBlockEntity {
        DraftBlockEntity {
            id: id.into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            duration_minutes: Some(60),
            work_type: WorkType::Shallow,
            category_id: Some("writing".into()),
            is_logged,
        }
    }

    #[test]
    fn test_normalize_merges_and_orders() {
        let entries = normalize(
            vec![record("b", 11, Some(30), Some("writing")), record("a", 8, Some(45), None)],
            vec![draft("c", 9, false), draft("d", 10, true)],
        );

        let ids = entries.iter().map(|v| v.id.as_ref()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "c", "b"]);
        assert_eq!(entries[0].source, EntrySource::Logged);
        assert_eq!(entries[1].source, EntrySource::Planned);
    }

    #[test]
    fn test_normalize_repairs_bad_values() {
        let entries = normalize(
            vec![
                record("a", 8, Some(-20), Some("  ")),
                record("b", 9, None, Some("")),
                record("c", 10, Some(i64::MAX), Some(" reading ")),
            ],
            vec![],
        );
        assert_eq!(entries[0].duration_minutes, 0);
        assert_eq!(entries[0].category_id, None);
        assert_eq!(entries[1].duration_minutes, 0);
        assert_eq!(entries[1].category_id, None);
        assert_eq!(entries[2].duration_minutes, u32::MAX);
        assert_eq!(entries[2].category_id.as_deref(), Some("reading"));
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(vec![], vec![]).is_empty());
    }
}
