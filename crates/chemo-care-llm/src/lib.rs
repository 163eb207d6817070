//! Trend summaries for blood-count records using a hosted text model.
//!
//! The summarizer is a stateless consumer of the record store: it takes the
//! five most recent records and the optional profile, and always returns text.

pub mod config;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod prompts;
pub mod summary;

pub use config::GeminiConfig;
#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
pub use prompts::*;
pub use summary::*;
