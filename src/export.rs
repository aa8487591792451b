use std::{borrow::Cow, io::Write};

use anyhow::Result;
use chrono::NaiveDateTime;

use crate::engine::entry::ActivityEntry;

pub const CSV_HEADER: &str = "date,time,duration_minutes,work_type,category_id";

/// Writes completed entries as CSV rows, returns the number of rows written.
pub fn write_csv(
    entries: &[ActivityEntry],
    now: NaiveDateTime,
    writer: &mut impl Write,
) -> Result<usize> {
    writeln!(writer, "{CSV_HEADER}")?;
    let mut rows = 0;
    for entry in entries.iter().filter(|v| v.is_completed(now)) {
        writeln!(
            writer,
            "{},{},{},{},{}",
            entry.start.format("%Y-%m-%d"),
            entry.start.format("%H:%M"),
            entry.duration_minutes,
            entry.work_type,
            escape(entry.category_id.as_deref().unwrap_or("")),
        )?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

fn escape(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::write_csv;
    use crate::engine::entry::{test_entries::*, WorkType};

    #[test]
    fn test_write_csv() {
        let entries = vec![
            entry("a", at(2025, 3, 10, 9), 45, Some("writing"), WorkType::Deep),
            entry("b", at(2025, 3, 10, 11), 20, None, WorkType::Other),
            entry("c", at(2025, 3, 11, 8), 30, Some("a \"b\", c"), WorkType::Shallow),
            planned(entry("d", at(2025, 3, 12, 8), 30, None, WorkType::Deep)),
        ];
        let mut out = Vec::new();
        let rows = write_csv(&entries, at(2025, 3, 11, 12), &mut out).unwrap();

        assert_eq!(rows, 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "date,time,duration_minutes,work_type,category_id\n\
             2025-03-10,09:00,45,deep,writing\n\
             2025-03-10,11:00,20,other,\n\
             2025-03-11,08:00,30,shallow,\"a \"\"b\"\", c\"\n"
        );
    }

    #[test]
    fn test_write_csv_empty() {
        let mut out = Vec::new();
        assert_eq!(write_csv(&[], at(2025, 3, 11, 12), &mut out).unwrap(), 0);
        assert_eq!(out, b"date,time,duration_minutes,work_type,category_id\n");
    }
}
