//! Prompt template for blood-count trend summaries.

use chemo_care_core::models::{BloodRecord, Metric, UserProfile};

/// How many of the most recent records go into a summary.
pub const MAX_SUMMARY_RECORDS: usize = 5;

/// Instructions appended after the data.
pub const SUMMARY_INSTRUCTIONS: &str = r#"Please provide a supportive, easy-to-understand summary of the blood count trends.
1. Highlight any significant drops or improvements.
2. Mention if values are within normal ranges or if they indicate typical chemotherapy side effects (like neutropenia).
3. Keep the tone encouraging but realistic.
4. Do not give medical advice or prescribe medication. Always advise consulting their doctor for specific concerns.
5. Keep the response under 200 words."#;

/// One "- WBC: 3.5-9.5 ×10⁹/L" line per metric.
pub fn normal_ranges_block() -> String {
    Metric::ALL
        .iter()
        .map(|metric| {
            let range = metric.range();
            format!(
                "- {}: {}-{} {}",
                metric.abbreviation(),
                range.min,
                range.max,
                range.unit
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the summary prompt. `records` must already be oldest first.
pub fn build_summary_prompt(
    records: &[BloodRecord],
    profile: Option<&UserProfile>,
) -> Result<String, serde_json::Error> {
    let name = profile
        .map(|p| p.name.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("Patient");
    let diagnosis = profile
        .map(|p| p.disease_type.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown");
    let scheme = profile
        .map(|p| p.chemo_scheme.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown");

    let records_json = serde_json::to_string_pretty(records)?;

    Ok(format!(
        r#"You are a helpful medical assistant for a chemotherapy patient.

Patient Profile:
- Name: {name}
- Diagnosis: {diagnosis}
- Chemo Scheme: {scheme}

Normal Ranges:
{ranges}

Recent Blood Records (Oldest to Newest):
{records_json}

{SUMMARY_INSTRUCTIONS}"#,
        ranges = normal_ranges_block(),
    ))
}
