//! Record store: the single owner of the persisted profile and blood records.
//!
//! Everything is kept as three JSON documents in a [`KeyValueStore`]:
//!
//! | key                  | value                                   |
//! |----------------------|-----------------------------------------|
//! | `chemo_care_auth`    | `true` while signed in                  |
//! | `chemo_care_profile` | the [`UserProfile`]                     |
//! | `chemo_care_records` | array of [`BloodRecord`], date descending |

mod session;

pub use session::*;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::db::{DbError, KeyValueStore};
use crate::export::{records_to_csv, CsvDialect};
use crate::models::{BloodRecord, RecordError, UserProfile};

pub const AUTH_KEY: &str = "chemo_care_auth";
pub const PROFILE_KEY: &str = "chemo_care_profile";
pub const RECORDS_KEY: &str = "chemo_care_records";

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid record: {0}")]
    Validation(#[from] RecordError),

    #[error("Storage error: {0}")]
    Database(#[from] DbError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Profile and record collection over an injectable key-value backend.
pub struct RecordStore<S> {
    storage: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// The saved profile, or `None` before onboarding.
    pub fn get_profile(&self) -> StoreResult<Option<UserProfile>> {
        self.load_json(PROFILE_KEY)
    }

    /// Replace the profile wholesale.
    pub fn save_profile(&mut self, profile: &UserProfile) -> StoreResult<()> {
        self.store_json(PROFILE_KEY, profile)?;
        tracing::debug!(name = %profile.name, "Saved profile");
        Ok(())
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// All records, most recent first.
    pub fn list_records(&self) -> StoreResult<Vec<BloodRecord>> {
        let mut records = self.load_records()?;
        sort_store_order(&mut records);
        Ok(records)
    }

    /// Save a record, enforcing one record per date.
    ///
    /// If a record already exists for `record.date` its values are replaced but
    /// its id is kept; the caller's id is ignored. Returns the record as stored.
    /// Negative or non-finite values are rejected before anything is written.
    pub fn save_record(&mut self, record: BloodRecord) -> StoreResult<BloodRecord> {
        record.validate()?;

        let mut records = self.list_records()?;
        let stored = match records.iter_mut().find(|r| r.date == record.date) {
            Some(existing) => {
                let id = std::mem::take(&mut existing.id);
                *existing = BloodRecord { id, ..record };
                tracing::debug!(
                    id = %existing.id,
                    date = %existing.date,
                    "Replaced record for date"
                );
                existing.clone()
            }
            None => {
                tracing::debug!(id = %record.id, date = %record.date, "Inserted record");
                records.push(record.clone());
                record
            }
        };

        sort_store_order(&mut records);
        self.store_json(RECORDS_KEY, &records)?;
        Ok(stored)
    }

    /// Delete a record by id. Returns `false` if no record had that id.
    pub fn delete_record(&mut self, id: &str) -> StoreResult<bool> {
        let mut records = self.list_records()?;
        let before = records.len();
        records.retain(|r| r.id != id);

        if records.len() == before {
            return Ok(false);
        }

        self.store_json(RECORDS_KEY, &records)?;
        tracing::debug!(id = %id, "Deleted record");
        Ok(true)
    }

    /// The record for a given date, if any.
    pub fn find_by_date(&self, date: NaiveDate) -> StoreResult<Option<BloodRecord>> {
        Ok(self.list_records()?.into_iter().find(|r| r.date == date))
    }

    /// Records whose ISO date contains `fragment` (e.g. "2024-03"), in store order.
    pub fn search_by_date(&self, fragment: &str) -> StoreResult<Vec<BloodRecord>> {
        Ok(self
            .list_records()?
            .into_iter()
            .filter(|r| r.date_string().contains(fragment))
            .collect())
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// CSV of all records in store order, with text fields left unescaped.
    pub fn export_csv(&self) -> StoreResult<String> {
        self.export_csv_with(CsvDialect::Unescaped)
    }

    pub fn export_csv_with(&self, dialect: CsvDialect) -> StoreResult<String> {
        Ok(records_to_csv(&self.list_records()?, dialect))
    }

    // =========================================================================
    // JSON helpers
    // =========================================================================

    /// Read and parse a key. Unparseable data is logged and treated as absent.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ignoring unparseable stored value");
                Ok(None)
            }
        }
    }

    /// Parse the record array entry by entry, so one malformed record does not
    /// hide the others.
    fn load_records(&self) -> StoreResult<Vec<BloodRecord>> {
        let entries: Vec<serde_json::Value> = self.load_json(RECORDS_KEY)?.unwrap_or_default();
        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<BloodRecord>(entry) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping unparseable stored record")
                }
            }
        }
        Ok(records)
    }

    fn store_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;
        self.storage.set(key, &json)?;
        Ok(())
    }
}

/// Date descending. Stable, so equal dates keep their relative order.
fn sort_store_order(records: &mut [BloodRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}
