//! Chart and badge data derived from the store-ordered record list.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{BloodRecord, Metric, RangeStatus};

/// One point on a trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A single classified value, as shown on a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricReading {
    pub metric: Metric,
    pub value: f64,
    pub unit: &'static str,
    pub status: RangeStatus,
}

/// Store order (newest first) reversed to oldest first.
pub fn chronological(records: &[BloodRecord]) -> Vec<BloodRecord> {
    records.iter().rev().cloned().collect()
}

/// Most recent record of a store-ordered list.
pub fn latest(records: &[BloodRecord]) -> Option<&BloodRecord> {
    records.first()
}

/// Values of one metric, oldest first.
pub fn series(records: &[BloodRecord], metric: Metric) -> Vec<ChartPoint> {
    records
        .iter()
        .rev()
        .map(|r| ChartPoint {
            date: r.date,
            value: r.value(metric),
        })
        .collect()
}

/// Lower and upper reference lines for a chart.
pub fn reference_lines(metric: Metric) -> (f64, f64) {
    let range = metric.range();
    (range.min, range.max)
}

/// Every metric of a record, classified.
pub fn panel_readings(record: &BloodRecord) -> [MetricReading; 4] {
    Metric::ALL.map(|metric| MetricReading {
        metric,
        value: record.value(metric),
        unit: metric.range().unit,
        status: record.status(metric),
    })
}

/// The `limit` most recent records, oldest first. Sorts by date itself so the
/// input order does not matter.
pub fn recent_chronological(records: &[BloodRecord], limit: usize) -> Vec<BloodRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));
    let skip = sorted.len().saturating_sub(limit);
    sorted.split_off(skip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(d: &str, wbc: f64) -> BloodRecord {
        BloodRecord {
            id: d.to_string(),
            date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
            wbc,
            neu: 1.2,
            plt: 360.0,
            hgb: 120.0,
            notes: None,
        }
    }

    fn store_ordered() -> Vec<BloodRecord> {
        vec![
            record("2024-03-01", 5.0),
            record("2024-02-01", 3.0),
            record("2024-01-01", 4.0),
        ]
    }

    #[test]
    fn test_chronological_and_latest() {
        let records = store_ordered();
        let asc = chronological(&records);
        assert_eq!(asc[0].id, "2024-01-01");
        assert_eq!(asc[2].id, "2024-03-01");
        assert_eq!(latest(&records).unwrap().id, "2024-03-01");
        assert!(latest(&[]).is_none());
    }

    #[test]
    fn test_series() {
        let points = series(&store_ordered(), Metric::Wbc);
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![4.0, 3.0, 5.0]);
    }

    #[test]
    fn test_reference_lines() {
        assert_eq!(reference_lines(Metric::Plt), (125.0, 350.0));
    }

    #[test]
    fn test_panel_readings() {
        let readings = panel_readings(&record("2024-01-01", 3.0));
        assert_eq!(readings[0].metric, Metric::Wbc);
        assert_eq!(readings[0].status, RangeStatus::Low);
        assert_eq!(readings[1].status, RangeStatus::Low);
        assert_eq!(readings[2].status, RangeStatus::High);
        assert_eq!(readings[3].status, RangeStatus::Normal);
        assert_eq!(readings[3].unit, "g/L");
    }

    #[test]
    fn test_recent_chronological_window() {
        let records: Vec<BloodRecord> = (1..=7)
            .rev()
            .map(|day| record(&format!("2024-01-0{}", day), day as f64))
            .collect();

        let recent = recent_chronological(&records, 5);
        let ids: Vec<&str> = recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["2024-01-03", "2024-01-04", "2024-01-05", "2024-01-06", "2024-01-07"]
        );

        assert_eq!(recent_chronological(&records[..2], 5).len(), 2);
        assert!(recent_chronological(&[], 5).is_empty());
    }
}
