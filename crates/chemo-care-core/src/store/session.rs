//! Sign-in flag and onboarding gate.
//!
//! The flag is a local placeholder: no credentials are checked.

use serde::{Deserialize, Serialize};

use super::{RecordStore, StoreResult, AUTH_KEY, PROFILE_KEY, RECORDS_KEY};
use crate::db::KeyValueStore;

/// Which screen the app should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No sign-in flag.
    SignedOut,
    /// Signed in, but no profile saved yet.
    NeedsOnboarding,
    /// Signed in with a profile; dashboard is available.
    Ready,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn is_authenticated(&self) -> StoreResult<bool> {
        Ok(self.storage.get(AUTH_KEY)?.is_some())
    }

    pub fn login(&mut self) -> StoreResult<()> {
        self.storage.set(AUTH_KEY, "true")?;
        tracing::debug!("Signed in");
        Ok(())
    }

    /// Clear the sign-in flag. Profile and records are kept.
    pub fn logout(&mut self) -> StoreResult<()> {
        self.storage.remove(AUTH_KEY)?;
        tracing::debug!("Signed out");
        Ok(())
    }

    pub fn session_state(&self) -> StoreResult<SessionState> {
        if !self.is_authenticated()? {
            return Ok(SessionState::SignedOut);
        }
        if self.get_profile()?.is_none() {
            return Ok(SessionState::NeedsOnboarding);
        }
        Ok(SessionState::Ready)
    }

    /// Remove the sign-in flag, the profile and every record.
    pub fn reset(&mut self) -> StoreResult<()> {
        for key in [AUTH_KEY, PROFILE_KEY, RECORDS_KEY] {
            self.storage.remove(key)?;
        }
        tracing::info!("Cleared all local data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{BloodRecord, Gender, UserProfile};
    use chrono::NaiveDate;

    fn profile() -> UserProfile {
        UserProfile {
            name: "Jane Doe".into(),
            age: Some(52),
            gender: Gender::Female,
            weight_kg: Some(60.0),
            height_cm: Some(165.0),
            disease_type: "Breast Cancer".into(),
            chemo_scheme: "TC".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        }
    }

    #[test]
    fn test_session_transitions() {
        let mut store = RecordStore::new(MemoryStore::new());
        assert_eq!(store.session_state().unwrap(), SessionState::SignedOut);

        store.login().unwrap();
        assert!(store.is_authenticated().unwrap());
        assert_eq!(store.session_state().unwrap(), SessionState::NeedsOnboarding);

        store.save_profile(&profile()).unwrap();
        assert_eq!(store.session_state().unwrap(), SessionState::Ready);

        store.logout().unwrap();
        assert_eq!(store.session_state().unwrap(), SessionState::SignedOut);

        // Logging back in skips onboarding
        store.login().unwrap();
        assert_eq!(store.session_state().unwrap(), SessionState::Ready);
    }

    #[test]
    fn test_logout_keeps_data() {
        let mut store = RecordStore::new(MemoryStore::new());
        store.login().unwrap();
        store.save_profile(&profile()).unwrap();
        store
            .save_record(BloodRecord::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                4.0,
                2.0,
                200.0,
                130.0,
            ))
            .unwrap();

        store.logout().unwrap();
        assert_eq!(store.get_profile().unwrap(), Some(profile()));
        assert_eq!(store.list_records().unwrap().len(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = RecordStore::new(MemoryStore::new());
        store.login().unwrap();
        store.save_profile(&profile()).unwrap();
        store
            .save_record(BloodRecord::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                4.0,
                2.0,
                200.0,
                130.0,
            ))
            .unwrap();

        store.reset().unwrap();
        assert!(store.storage().is_empty());
        assert_eq!(store.session_state().unwrap(), SessionState::SignedOut);
    }

    #[test]
    fn test_profile_overwrite_is_whole_value() {
        let mut store = RecordStore::new(MemoryStore::new());
        store.save_profile(&profile()).unwrap();

        let mut updated = profile();
        updated.age = None;
        updated.chemo_scheme = "AC-T".into();
        store.save_profile(&updated).unwrap();

        let saved = store.get_profile().unwrap().unwrap();
        assert_eq!(saved.age, None);
        assert_eq!(saved.chemo_scheme, "AC-T");
    }

    #[test]
    fn test_legacy_text_profile_counts_as_onboarded() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                PROFILE_KEY,
                r#"{"name":"Jane Doe","age":"52","gender":"Female","weight":"60","height":"165",
                    "diseaseType":"Breast Cancer","chemoScheme":"TC","startDate":"2024-01-10"}"#,
            )
            .unwrap();

        let mut store = RecordStore::new(storage);
        assert_eq!(store.get_profile().unwrap(), Some(profile()));

        store.login().unwrap();
        assert_eq!(store.session_state().unwrap(), SessionState::Ready);
    }
}
