//! Reference ranges and three-way range classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four tracked hematology metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// White blood cells (×10⁹/L)
    Wbc,
    /// Neutrophils (×10⁹/L)
    Neu,
    /// Platelets (×10⁹/L)
    Plt,
    /// Hemoglobin (g/L)
    Hgb,
}

/// Clinically normal interval for a metric. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
    pub label: &'static str,
}

const WBC_RANGE: ReferenceRange = ReferenceRange {
    min: 3.5,
    max: 9.5,
    unit: "×10⁹/L",
    label: "White Blood Cells",
};

const NEU_RANGE: ReferenceRange = ReferenceRange {
    min: 1.8,
    max: 6.3,
    unit: "×10⁹/L",
    label: "Neutrophils",
};

const PLT_RANGE: ReferenceRange = ReferenceRange {
    min: 125.0,
    max: 350.0,
    unit: "×10⁹/L",
    label: "Platelets",
};

const HGB_RANGE: ReferenceRange = ReferenceRange {
    min: 115.0,
    max: 150.0,
    unit: "g/L",
    label: "Hemoglobin",
};

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Metric; 4] = [Metric::Wbc, Metric::Neu, Metric::Plt, Metric::Hgb];

    /// Lowercase key used in persisted JSON and chart data.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Wbc => "wbc",
            Metric::Neu => "neu",
            Metric::Plt => "plt",
            Metric::Hgb => "hgb",
        }
    }

    /// Uppercase abbreviation shown on badges and CSV headers.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Metric::Wbc => "WBC",
            Metric::Neu => "NEU",
            Metric::Plt => "PLT",
            Metric::Hgb => "HGB",
        }
    }

    /// Static reference range for this metric.
    pub fn range(self) -> &'static ReferenceRange {
        match self {
            Metric::Wbc => &WBC_RANGE,
            Metric::Neu => &NEU_RANGE,
            Metric::Plt => &PLT_RANGE,
            Metric::Hgb => &HGB_RANGE,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unknown metric key.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown metric: {0}")]
pub struct MetricParseError(pub String);

impl FromStr for Metric {
    type Err = MetricParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wbc" => Ok(Metric::Wbc),
            "neu" => Ok(Metric::Neu),
            "plt" => Ok(Metric::Plt),
            "hgb" => Ok(Metric::Hgb),
            _ => Err(MetricParseError(s.to_string())),
        }
    }
}

/// Where a reading sits relative to its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeStatus {
    Low,
    Normal,
    High,
}

impl RangeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RangeStatus::Low => "low",
            RangeStatus::Normal => "normal",
            RangeStatus::High => "high",
        }
    }
}

impl fmt::Display for RangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ReferenceRange {
    /// Classify a value against this range.
    pub fn classify(&self, value: f64) -> RangeStatus {
        if value < self.min {
            RangeStatus::Low
        } else if value > self.max {
            RangeStatus::High
        } else {
            RangeStatus::Normal
        }
    }
}

/// Classify a single reading for the given metric.
pub fn classify(metric: Metric, value: f64) -> RangeStatus {
    metric.range().classify(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(classify(Metric::Hgb, 115.0), RangeStatus::Normal);
        assert_eq!(classify(Metric::Hgb, 150.0), RangeStatus::Normal);
        assert_eq!(classify(Metric::Wbc, 9.5), RangeStatus::Normal);
        assert_eq!(classify(Metric::Wbc, 3.5), RangeStatus::Normal);
    }

    #[test]
    fn test_low_and_high() {
        assert_eq!(classify(Metric::Hgb, 114.999), RangeStatus::Low);
        assert_eq!(classify(Metric::Plt, 351.0), RangeStatus::High);
        assert_eq!(classify(Metric::Neu, 0.5), RangeStatus::Low);
        assert_eq!(classify(Metric::Neu, 6.31), RangeStatus::High);
    }

    #[test]
    fn test_parse_metric_keys() {
        assert_eq!("wbc".parse::<Metric>(), Ok(Metric::Wbc));
        assert_eq!("HGB".parse::<Metric>(), Ok(Metric::Hgb));
        assert_eq!(" plt ".parse::<Metric>(), Ok(Metric::Plt));
        assert!("rbc".parse::<Metric>().is_err());
    }

    #[test]
    fn test_key_round_trips_through_parse() {
        for metric in Metric::ALL {
            assert_eq!(metric.key().parse::<Metric>(), Ok(metric));
        }
    }

    #[test]
    fn test_units() {
        assert_eq!(Metric::Hgb.range().unit, "g/L");
        assert_eq!(Metric::Plt.range().unit, "×10⁹/L");
        assert_eq!(Metric::Neu.range().label, "Neutrophils");
    }
}
