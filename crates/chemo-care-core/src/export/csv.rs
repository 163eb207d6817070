//! CSV export of blood records.

use crate::models::BloodRecord;

/// Fixed header row.
pub const CSV_HEADER: &str = "Date,WBC,NEU,PLT,HGB,Notes";

/// How text fields are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvDialect {
    /// Fields are joined verbatim. A note containing a comma or newline
    /// shifts or splits its row.
    #[default]
    Unescaped,
    /// Fields containing a comma, quote or newline are quoted with doubled quotes.
    Rfc4180,
}

/// Render records, in the order given, as CSV text. Rows are separated by
/// `\n` with no trailing newline, so N records produce N+1 lines.
pub fn records_to_csv(records: &[BloodRecord], dialect: CsvDialect) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for record in records {
        let notes = record.notes.as_deref().unwrap_or("");
        let notes = match dialect {
            CsvDialect::Unescaped => notes.to_string(),
            CsvDialect::Rfc4180 => escape_csv(notes),
        };
        lines.push(format!(
            "{},{},{},{},{},{}",
            record.date_string(),
            record.wbc,
            record.neu,
            record.plt,
            record.hgb,
            notes,
        ));
    }

    lines.join("\n")
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
