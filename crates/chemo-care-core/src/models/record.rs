//! Blood panel records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::reference::{classify, Metric, RangeStatus};

/// Record validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("{metric} cannot be negative (got {value})")]
    NegativeValue { metric: Metric, value: f64 },

    #[error("{metric} must be a finite number")]
    NonFinite { metric: Metric },
}

/// One dated blood panel. The date is the natural key: the store keeps at most
/// one record per date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BloodRecord {
    /// Stable identifier, kept across same-date overwrites
    pub id: String,
    /// Test date (ISO `YYYY-MM-DD` on the wire)
    pub date: NaiveDate,
    /// White blood cells, ×10⁹/L
    pub wbc: f64,
    /// Neutrophils, ×10⁹/L
    pub neu: f64,
    /// Platelets, ×10⁹/L
    pub plt: f64,
    /// Hemoglobin, g/L
    pub hgb: f64,
    /// Free-text notes ("How did you feel?")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BloodRecord {
    /// Create a record with a fresh UUID.
    pub fn new(date: NaiveDate, wbc: f64, neu: f64, plt: f64, hgb: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            wbc,
            neu,
            plt,
            hgb,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Value of a single metric.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Wbc => self.wbc,
            Metric::Neu => self.neu,
            Metric::Plt => self.plt,
            Metric::Hgb => self.hgb,
        }
    }

    /// Range status of a single metric.
    pub fn status(&self, metric: Metric) -> RangeStatus {
        classify(metric, self.value(metric))
    }

    /// Check that every metric is a finite, non-negative number.
    pub fn validate(&self) -> Result<(), RecordError> {
        for metric in Metric::ALL {
            let value = self.value(metric);
            if !value.is_finite() {
                return Err(RecordError::NonFinite { metric });
            }
            if value < 0.0 {
                return Err(RecordError::NegativeValue { metric, value });
            }
        }
        Ok(())
    }

    /// ISO date text, as shown in history and matched by date search.
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
