//! # Export Module
//!
//! Deterministic ordering and CSV rendering of finished session records
//!
//! ## Key Components
//! - [`rank_records`] - Stable ordering by key or by start time
//! - [`render_csv`] - Render all records into one output string

use chrono::{Local, TimeZone};

use crate::cli::SortField;
use crate::errors::FlowError;
use crate::session_builder::SessionRecord;

/// Order records for export. Both orders are total, so equal inputs always
/// export identically.
pub fn rank_records(mut records: Vec<SessionRecord>, sort: SortField) -> Vec<SessionRecord> {
    records.sort_by(|a, b| match sort {
        SortField::Key => (&a.key, a.start).cmp(&(&b.key, b.start)),
        SortField::Start => (a.start, &a.key).cmp(&(b.start, &b.key)),
    });
    records
}

/// Render records as CSV lines: key, start, end, total kilobytes.
pub fn render_csv(records: &[SessionRecord]) -> Result<String, FlowError> {
    let mut output = String::new();
    for record in records {
        let end = record.end.ok_or_else(|| FlowError::UnclosedRecord {
            key: record.key.clone(),
        })?;
        output.push_str(&format!(
            "{},{},{},{}\n",
            record.key,
            format_local(record.start),
            format_local(end),
            record.total_kilobytes
        ));
    }
    Ok(output)
}

fn format_local(epoch_secs: i64) -> String {
    match Local.timestamp_opt(epoch_secs, 0).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => epoch_secs.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn create_test_record(key: &str, start: i64, end: i64, kilobytes: u64) -> SessionRecord {
        SessionRecord {
            key: key.to_string(),
            start,
            end: Some(end),
            last_seen: end,
            total_kilobytes: kilobytes,
        }
    }

    fn parse_local(text: &str) -> i64 {
        let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap();
        Local.from_local_datetime(&naive).single().unwrap().timestamp()
    }

    #[test]
    fn test_rank_by_start_breaks_ties_by_key() {
        let records = vec![
            create_test_record("b|x", 100, 200, 1),
            create_test_record("a|x", 100, 200, 1),
            create_test_record("c|x", 50, 80, 1),
        ];

        let ranked = rank_records(records, SortField::Start);
        assert_eq!(ranked[0].key, "c|x");
        assert_eq!(ranked[1].key, "a|x");
        assert_eq!(ranked[2].key, "b|x");
    }

    #[test]
    fn test_rank_by_key_orders_instances_by_start() {
        let records = vec![
            create_test_record("b|x", 100, 200, 1),
            create_test_record("a|x", 900, 950, 1),
            create_test_record("a|x", 100, 200, 1),
        ];

        let ranked = rank_records(records, SortField::Key);
        assert_eq!((ranked[0].key.as_str(), ranked[0].start), ("a|x", 100));
        assert_eq!((ranked[1].key.as_str(), ranked[1].start), ("a|x", 900));
        assert_eq!((ranked[2].key.as_str(), ranked[2].start), ("b|x", 100));
    }

    #[test]
    fn test_export_is_deterministic() {
        let records = vec![
            create_test_record("b|x", 100, 200, 5),
            create_test_record("a|x", 100, 300, 7),
            create_test_record("a|x", 400, 500, 2),
        ];

        let first = render_csv(&rank_records(records.clone(), SortField::Start)).unwrap();
        let second = render_csv(&rank_records(records, SortField::Start)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_line_format_round_trips() {
        let record = create_test_record("a|b", 1_700_000_000, 1_700_000_600, 42);
        let output = render_csv(&[record]).unwrap();

        let line = output.trim_end();
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], "a|b");
        assert_eq!(parse_local(fields[1]), 1_700_000_000);
        assert_eq!(parse_local(fields[2]), 1_700_000_600);
        assert_eq!(fields[3], "42");
    }

    #[test]
    fn test_render_one_line_per_record() {
        let records = vec![
            create_test_record("a|x", 0, 100, 1),
            create_test_record("b|x", 200, 300, 2),
        ];
        let output = render_csv(&records).unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_render_fails_on_open_record() {
        let mut record = create_test_record("a|b", 0, 100, 1);
        record.end = None;

        let err = render_csv(&[record]).unwrap_err();
        assert!(matches!(err, FlowError::UnclosedRecord { ref key } if key == "a|b"));
    }
}
