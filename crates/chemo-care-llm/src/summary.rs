//! Trend summaries that never fail: every error becomes a readable message.

use chemo_care_core::models::{BloodRecord, UserProfile};
use chemo_care_core::trends::recent_chronological;
use thiserror::Error;

use crate::prompts::{build_summary_prompt, MAX_SUMMARY_RECORDS};

pub const MISSING_KEY_MESSAGE: &str = "API Key is missing. Please configure the environment.";
pub const NO_RECORDS_MESSAGE: &str = "No records available to analyze.";
pub const EMPTY_RESPONSE_MESSAGE: &str = "Could not generate analysis.";
pub const FAILURE_MESSAGE: &str =
    "Sorry, I couldn't analyze the data at this moment. Please try again later.";

/// Text generation errors.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No API key configured")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    ResponseParsing(String),

    #[error("Prompt serialization error: {0}")]
    Prompt(#[from] serde_json::Error),
}

/// A single request-response call to a text model.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Whether credentials are present. Checked before any other work.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Produces a short supportive summary of recent blood counts.
pub struct TrendSummarizer<G> {
    generator: G,
}

impl<G: TextGenerator> TrendSummarizer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Summarize the five most recent records. Records may be in any order.
    pub fn summarize(&self, records: &[BloodRecord], profile: Option<&UserProfile>) -> String {
        if !self.generator.is_configured() {
            return MISSING_KEY_MESSAGE.to_string();
        }

        let recent = recent_chronological(records, MAX_SUMMARY_RECORDS);
        if recent.is_empty() {
            return NO_RECORDS_MESSAGE.to_string();
        }

        match self.try_summarize(&recent, profile) {
            Ok(text) if text.is_empty() => EMPTY_RESPONSE_MESSAGE.to_string(),
            Ok(text) => text,
            Err(GenerationError::MissingCredential) => MISSING_KEY_MESSAGE.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Trend summary failed");
                FAILURE_MESSAGE.to_string()
            }
        }
    }

    fn try_summarize(
        &self,
        recent: &[BloodRecord],
        profile: Option<&UserProfile>,
    ) -> Result<String, GenerationError> {
        let prompt = build_summary_prompt(recent, profile)?;
        tracing::debug!(records = recent.len(), "Requesting trend summary");
        self.generator.generate(&prompt)
    }
}

/// Mock generator for testing without network access.
pub struct MockGenerator {
    response: Result<String, String>,
    configured: bool,
    last_prompt: std::cell::RefCell<Option<String>>,
}

impl MockGenerator {
    /// Always answers with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            configured: true,
            last_prompt: std::cell::RefCell::new(None),
        }
    }

    /// Always fails with an HTTP error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            configured: true,
            last_prompt: std::cell::RefCell::new(None),
        }
    }

    /// Reports no credentials.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new("")
        }
    }

    /// The most recent prompt passed to `generate`.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.borrow().clone()
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        *self.last_prompt.borrow_mut() = Some(prompt.to_string());
        self.response.clone().map_err(GenerationError::Http)
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: u32) -> BloodRecord {
        BloodRecord {
            id: day.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            wbc: 3.0 + day as f64 / 10.0,
            neu: 1.5,
            plt: 180.0,
            hgb: 121.0,
            notes: None,
        }
    }

    #[test]
    fn test_returns_generated_text() {
        let summarizer = TrendSummarizer::new(MockGenerator::new("Counts are recovering."));
        assert_eq!(summarizer.summarize(&[record(1)], None), "Counts are recovering.");
    }

    #[test]
    fn test_missing_key_checked_first() {
        let summarizer = TrendSummarizer::new(MockGenerator::unconfigured());
        assert_eq!(summarizer.summarize(&[], None), MISSING_KEY_MESSAGE);
        assert!(summarizer.generator().last_prompt().is_none());
    }

    #[test]
    fn test_no_records() {
        let summarizer = TrendSummarizer::new(MockGenerator::new("unused"));
        assert_eq!(summarizer.summarize(&[], None), NO_RECORDS_MESSAGE);
        assert!(summarizer.generator().last_prompt().is_none());
    }

    #[test]
    fn test_empty_response() {
        let summarizer = TrendSummarizer::new(MockGenerator::new(""));
        assert_eq!(summarizer.summarize(&[record(1)], None), EMPTY_RESPONSE_MESSAGE);

        // Only a truly empty answer is replaced
        let summarizer = TrendSummarizer::new(MockGenerator::new("  "));
        assert_eq!(summarizer.summarize(&[record(1)], None), "  ");
    }

    #[test]
    fn test_failure_is_absorbed() {
        let summarizer = TrendSummarizer::new(MockGenerator::failing("connection refused"));
        assert_eq!(summarizer.summarize(&[record(1)], None), FAILURE_MESSAGE);
    }

    #[test]
    fn test_only_five_most_recent_oldest_first() {
        let summarizer = TrendSummarizer::new(MockGenerator::new("ok"));
        // Store order: newest first
        let records: Vec<BloodRecord> = (1..=8).rev().map(record).collect();
        summarizer.summarize(&records, None);

        let prompt = summarizer.generator().last_prompt().unwrap();
        assert!(!prompt.contains("2024-03-03"));
        let positions: Vec<usize> = (4..=8)
            .map(|day| prompt.find(&format!("2024-03-0{}", day)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
