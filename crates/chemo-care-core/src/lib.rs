//! Chemo Care Core Library
//!
//! Local-first blood-panel tracking for chemotherapy patients.
//!
//! # Architecture
//!
//! ```text
//!   UI (onboarding, dashboard, history)
//!          │ save / delete / list
//!          ▼
//!   ┌──────────────────────────────┐
//!   │         RecordStore          │   one record per date,
//!   │  profile + records as JSON   │   date-descending order
//!   └──────────────┬───────────────┘
//!                  │ KeyValueStore
//!          ┌───────┴────────┐
//!          ▼                ▼
//!     SQLite kv_store   MemoryStore
//!
//!   records ──► classify(metric, value) ──► low / normal / high badges
//!   records ──► trends ──► chart series, reference lines
//!   records ──► export ──► CSV
//! ```
//!
//! # Modules
//!
//! - [`db`]: key-value storage contract with SQLite and in-memory backends
//! - [`models`]: Domain types (BloodRecord, UserProfile, Metric, ReferenceRange)
//! - [`store`]: Record store, sign-in flag and onboarding gate
//! - [`trends`]: Chart series and status badges
//! - [`export`]: CSV export

pub mod db;
pub mod export;
pub mod models;
pub mod store;
pub mod trends;

// Re-export commonly used types
pub use db::{Database, KeyValueStore, MemoryStore};
pub use export::CsvDialect;
pub use models::{
    classify, BloodRecord, Gender, Metric, ProfileDraft, RangeStatus, ReferenceRange,
    UserProfile,
};
pub use store::{RecordStore, SessionState, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ChemoCareError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for ChemoCareError {
    fn from(e: db::DbError) -> Self {
        ChemoCareError::DatabaseError(e.to_string())
    }
}

impl From<StoreError> for ChemoCareError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(e) => ChemoCareError::InvalidInput(e.to_string()),
            StoreError::Database(e) => e.into(),
            StoreError::Serialization(e) => ChemoCareError::SerializationError(e.to_string()),
        }
    }
}

impl From<models::ProfileError> for ChemoCareError {
    fn from(e: models::ProfileError) -> Self {
        ChemoCareError::InvalidInput(e.to_string())
    }
}

impl From<models::MetricParseError> for ChemoCareError {
    fn from(e: models::MetricParseError) -> Self {
        ChemoCareError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ChemoCareError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ChemoCareError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ChemoCareError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ChemoCareError::InvalidInput(format!("Invalid date: {:?}", s)))
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<ChemoCareCore>, ChemoCareError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(ChemoCareCore {
        store: Arc::new(Mutex::new(RecordStore::new(db))),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<ChemoCareCore>, ChemoCareError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(ChemoCareCore {
        store: Arc::new(Mutex::new(RecordStore::new(db))),
    }))
}

/// Classify a reading ("wbc", "neu", "plt" or "hgb").
#[uniffi::export]
pub fn classify_reading(metric: String, value: f64) -> Result<FfiRangeStatus, ChemoCareError> {
    let metric: Metric = metric.parse()?;
    Ok(classify(metric, value).into())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ChemoCareCore {
    store: Arc<Mutex<RecordStore<Database>>>,
}

#[uniffi::export]
impl ChemoCareCore {
    // =========================================================================
    // Session Operations
    // =========================================================================

    pub fn login(&self) -> Result<(), ChemoCareError> {
        self.store.lock()?.login()?;
        Ok(())
    }

    pub fn logout(&self) -> Result<(), ChemoCareError> {
        self.store.lock()?.logout()?;
        Ok(())
    }

    pub fn is_authenticated(&self) -> Result<bool, ChemoCareError> {
        Ok(self.store.lock()?.is_authenticated()?)
    }

    /// Which screen to show: sign-in, onboarding or dashboard.
    pub fn session_state(&self) -> Result<FfiSessionState, ChemoCareError> {
        Ok(self.store.lock()?.session_state()?.into())
    }

    /// Erase the sign-in flag, profile and all records.
    pub fn reset(&self) -> Result<(), ChemoCareError> {
        self.store.lock()?.reset()?;
        Ok(())
    }

    // =========================================================================
    // Profile Operations
    // =========================================================================

    pub fn get_profile(&self) -> Result<Option<FfiUserProfile>, ChemoCareError> {
        let store = self.store.lock()?;
        Ok(store.get_profile()?.map(Into::into))
    }

    /// Validate and save the onboarding/profile form.
    pub fn save_profile(&self, profile: FfiUserProfile) -> Result<FfiUserProfile, ChemoCareError> {
        let profile = UserProfile::try_from(ProfileDraft::from(profile))?;
        self.store.lock()?.save_profile(&profile)?;
        Ok(profile.into())
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// All records, most recent first.
    pub fn list_records(&self) -> Result<Vec<FfiBloodRecord>, ChemoCareError> {
        let store = self.store.lock()?;
        let records = store.list_records()?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Save a record. An empty id gets a fresh UUID; a record on an existing
    /// date keeps that date's id.
    pub fn save_record(&self, record: FfiBloodRecord) -> Result<FfiBloodRecord, ChemoCareError> {
        let record = BloodRecord::try_from(record)?;
        let stored = self.store.lock()?.save_record(record)?;
        Ok(stored.into())
    }

    /// Delete by id. Returns false when nothing matched.
    pub fn delete_record(&self, id: String) -> Result<bool, ChemoCareError> {
        Ok(self.store.lock()?.delete_record(&id)?)
    }

    pub fn find_by_date(&self, date: String) -> Result<Option<FfiBloodRecord>, ChemoCareError> {
        let date = parse_date(&date)?;
        let store = self.store.lock()?;
        Ok(store.find_by_date(date)?.map(Into::into))
    }

    /// Records whose date contains the given text.
    pub fn search_records(&self, query: String) -> Result<Vec<FfiBloodRecord>, ChemoCareError> {
        let store = self.store.lock()?;
        let records = store.search_by_date(&query)?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Classified values of the most recent record, for the status badges.
    pub fn latest_readings(&self) -> Result<Vec<FfiMetricReading>, ChemoCareError> {
        let store = self.store.lock()?;
        let records = store.list_records()?;
        Ok(trends::latest(&records)
            .map(|r| trends::panel_readings(r).into_iter().map(Into::into).collect())
            .unwrap_or_default())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// CSV of all records. With `escaped` set, text fields are quoted per RFC 4180.
    pub fn export_csv(&self, escaped: bool) -> Result<String, ChemoCareError> {
        let dialect = if escaped {
            CsvDialect::Rfc4180
        } else {
            CsvDialect::Unescaped
        };
        Ok(self.store.lock()?.export_csv_with(dialect)?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiRangeStatus {
    Low,
    Normal,
    High,
}

impl From<RangeStatus> for FfiRangeStatus {
    fn from(status: RangeStatus) -> Self {
        match status {
            RangeStatus::Low => FfiRangeStatus::Low,
            RangeStatus::Normal => FfiRangeStatus::Normal,
            RangeStatus::High => FfiRangeStatus::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiSessionState {
    SignedOut,
    NeedsOnboarding,
    Ready,
}

impl From<SessionState> for FfiSessionState {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::SignedOut => FfiSessionState::SignedOut,
            SessionState::NeedsOnboarding => FfiSessionState::NeedsOnboarding,
            SessionState::Ready => FfiSessionState::Ready,
        }
    }
}

/// FFI-safe profile. Mirrors the form: every field is text.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiUserProfile {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub weight: String,
    pub height: String,
    pub disease_type: String,
    pub chemo_scheme: String,
    pub start_date: String,
}

impl From<UserProfile> for FfiUserProfile {
    fn from(profile: UserProfile) -> Self {
        Self {
            name: profile.name,
            age: profile.age.map(|a| a.to_string()).unwrap_or_default(),
            gender: profile.gender.to_string(),
            weight: profile.weight_kg.map(|w| w.to_string()).unwrap_or_default(),
            height: profile.height_cm.map(|h| h.to_string()).unwrap_or_default(),
            disease_type: profile.disease_type,
            chemo_scheme: profile.chemo_scheme,
            start_date: profile.start_date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<FfiUserProfile> for ProfileDraft {
    fn from(profile: FfiUserProfile) -> Self {
        ProfileDraft {
            name: profile.name,
            age: profile.age,
            gender: profile.gender,
            weight: profile.weight,
            height: profile.height,
            disease_type: profile.disease_type,
            chemo_scheme: profile.chemo_scheme,
            start_date: profile.start_date,
        }
    }
}

/// FFI-safe blood record.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiBloodRecord {
    pub id: String,
    pub date: String,
    pub wbc: f64,
    pub neu: f64,
    pub plt: f64,
    pub hgb: f64,
    pub notes: Option<String>,
}

impl From<BloodRecord> for FfiBloodRecord {
    fn from(record: BloodRecord) -> Self {
        Self {
            date: record.date_string(),
            id: record.id,
            wbc: record.wbc,
            neu: record.neu,
            plt: record.plt,
            hgb: record.hgb,
            notes: record.notes,
        }
    }
}

impl TryFrom<FfiBloodRecord> for BloodRecord {
    type Error = ChemoCareError;

    fn try_from(record: FfiBloodRecord) -> Result<Self, Self::Error> {
        let date = parse_date(&record.date)?;
        let mut parsed = BloodRecord::new(date, record.wbc, record.neu, record.plt, record.hgb);
        if !record.id.trim().is_empty() {
            parsed.id = record.id;
        }
        parsed.notes = record.notes.filter(|n| !n.is_empty());
        Ok(parsed)
    }
}

/// FFI-safe classified reading.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiMetricReading {
    pub metric: String,
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub status: FfiRangeStatus,
}

impl From<trends::MetricReading> for FfiMetricReading {
    fn from(reading: trends::MetricReading) -> Self {
        let range = reading.metric.range();
        Self {
            metric: reading.metric.key().to_string(),
            label: range.label.to_string(),
            value: reading.value,
            unit: reading.unit.to_string(),
            min: range.min,
            max: range.max,
            status: reading.status.into(),
        }
    }
}
