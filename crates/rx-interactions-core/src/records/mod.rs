//! Check record store.
//!
//! Append-only: records are created through [`CheckRecordStore::create`]
//! and never updated or deleted. Each record is sealed into a SHA-256
//! hash chain so that later tampering is detectable.

mod chain;
mod clock;

pub use chain::{verify, ChainVerification, GENESIS_HASH};
pub use clock::*;

use thiserror::Error;
use tracing::{info, warn};

use crate::matcher::InteractionMatcher;
use crate::models::{CheckId, CheckRecord, UnsealedRecord};

/// Minimum number of medications for a meaningful check.
pub const MIN_MEDICATIONS: usize = 2;

/// Input rejected before any matching work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Patient name is required")]
    EmptyPatientName,

    #[error("At least 2 medications are required, found {found}")]
    TooFewMedications { found: usize },
}

pub type RecordResult<T> = Result<T, ValidationError>;

/// Retains check records for the lifetime of the store.
pub struct CheckRecordStore {
    /// Creation order
    records: Vec<CheckRecord>,
    clock: Box<dyn Clock>,
}

impl Default for CheckRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckRecordStore {
    /// Create an empty store stamped with wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Create an empty store with a custom timestamp source.
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            records: Vec::new(),
            clock,
        }
    }

    /// Run a check and retain its result as a new record.
    ///
    /// `medications` are kept exactly as submitted. Blank entries do not
    /// count towards the two-medication minimum. Blank notes are stored
    /// as no notes.
    pub fn create(
        &mut self,
        matcher: &InteractionMatcher<'_>,
        patient_name: &str,
        medications: Vec<String>,
        notes: Option<String>,
    ) -> RecordResult<CheckRecord> {
        let patient_name = patient_name.trim();
        if patient_name.is_empty() {
            warn!("rejected check record without patient name");
            return Err(ValidationError::EmptyPatientName);
        }

        let found = medications.iter().filter(|m| !m.trim().is_empty()).count();
        if found < MIN_MEDICATIONS {
            warn!(found, "rejected check record with too few medications");
            return Err(ValidationError::TooFewMedications { found });
        }

        let matched_interactions = matcher
            .check(medications.as_slice())
            .into_iter()
            .cloned()
            .collect();

        let unsealed = UnsealedRecord {
            id: CheckId(self.records.len() as u64 + 1),
            patient_name: patient_name.to_string(),
            medications,
            matched_interactions,
            check_date: self.clock.now(),
            notes: notes.filter(|n| !n.trim().is_empty()),
        };

        let previous_hash = self.head_hash().to_string();
        let record_hash = chain::seal_hash(&previous_hash, &unsealed);
        let record = CheckRecord::seal(unsealed, previous_hash, record_hash);

        info!(
            id = %record.id(),
            matched = record.matched_interactions().len(),
            high_severity = record.has_high_severity(),
            "created check record"
        );
        self.records.push(record.clone());
        Ok(record)
    }

    /// All records, most recent first. Call again to restart.
    pub fn list(&self) -> impl Iterator<Item = &CheckRecord> + '_ {
        self.records.iter().rev()
    }

    /// Records for one patient (case-insensitive), most recent first.
    pub fn for_patient<'a>(&'a self, patient_name: &str) -> impl Iterator<Item = &'a CheckRecord> + 'a {
        let wanted = patient_name.trim().to_lowercase();
        self.list()
            .filter(move |r| r.patient_name().to_lowercase() == wanted)
    }

    /// Get a record by id.
    pub fn get(&self, id: CheckId) -> Option<&CheckRecord> {
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.records.get(index)
    }

    /// Hash of the most recent record, or the genesis hash when empty.
    pub fn head_hash(&self) -> &str {
        self.records
            .last()
            .map(|r| r.record_hash())
            .unwrap_or(GENESIS_HASH)
    }

    /// Re-hash the full history.
    pub fn verify_chain(&self) -> ChainVerification {
        chain::verify(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use crate::models::{NewRule, Severity};
    use chrono::TimeZone;

    fn setup_kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.add_rule(NewRule::new("Warfarin", "Aspirin", Severity::Major)).unwrap();
        kb.add_rule(NewRule::new("Digoxin", "Amiodarone", Severity::Major)).unwrap();
        kb
    }

    fn meds(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn fixed_store() -> CheckRecordStore {
        let at = chrono::Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        CheckRecordStore::with_clock(Box::new(FixedClock(at)))
    }

    #[test]
    fn test_create_record() {
        let kb = setup_kb();
        let matcher = InteractionMatcher::new(&kb);
        let mut store = CheckRecordStore::new();

        let record = store
            .create(&matcher, "John Doe", meds(&["Warfarin", "Aspirin"]), Some(String::new()))
            .unwrap();

        assert_eq!(record.id(), CheckId(1));
        assert_eq!(record.patient_name(), "John Doe");
        assert_eq!(record.medications(), &["Warfarin", "Aspirin"]);
        assert_eq!(record.matched_interactions().len(), 1);
        assert_eq!(record.notes(), None);
        assert_eq!(record.previous_hash(), GENESIS_HASH);
        assert!(record.has_high_severity());
    }

    #[test]
    fn test_same_inputs_make_independent_records() {
        let kb = setup_kb();
        let matcher = InteractionMatcher::new(&kb);
        let mut store = CheckRecordStore::new();

        let first = store
            .create(&matcher, "John Doe", meds(&["Warfarin", "Aspirin"]), None)
            .unwrap();
        let second = store
            .create(&matcher, "John Doe", meds(&["Warfarin", "Aspirin"]), None)
            .unwrap();

        assert_ne!(first.id(), second.id());
        assert_eq!(second.previous_hash(), first.record_hash());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_validation_errors() {
        let kb = setup_kb();
        let matcher = InteractionMatcher::new(&kb);
        let mut store = CheckRecordStore::new();

        assert_eq!(
            store.create(&matcher, "  ", meds(&["Warfarin", "Aspirin"]), None),
            Err(ValidationError::EmptyPatientName)
        );
        assert_eq!(
            store.create(&matcher, "John Doe", meds(&["Warfarin"]), None),
            Err(ValidationError::TooFewMedications { found: 1 })
        );
        assert_eq!(
            store.create(&matcher, "John Doe", meds(&["Warfarin", " "]), None),
            Err(ValidationError::TooFewMedications { found: 1 })
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_repeated_medication_is_valid_but_matches_nothing() {
        let kb = setup_kb();
        let matcher = InteractionMatcher::new(&kb);
        let mut store = CheckRecordStore::new();

        let record = store
            .create(&matcher, "Jane Roe", meds(&["Warfarin", "Warfarin"]), None)
            .unwrap();
        assert!(record.matched_interactions().is_empty());
        assert_eq!(record.medications().len(), 2);
    }

    #[test]
    fn test_list_most_recent_first() {
        let kb = setup_kb();
        let matcher = InteractionMatcher::new(&kb);
        let mut store = CheckRecordStore::new();

        for patient in ["A", "B", "C"] {
            store
                .create(&matcher, patient, meds(&["Warfarin", "Aspirin"]), None)
                .unwrap();
        }

        let order: Vec<&str> = store.list().map(|r| r.patient_name()).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
        // Restartable
        assert_eq!(store.list().count(), 3);
        assert_eq!(store.get(CheckId(2)).unwrap().patient_name(), "B");
        assert!(store.get(CheckId(0)).is_none());
    }

    #[test]
    fn test_for_patient() {
        let kb = setup_kb();
        let matcher = InteractionMatcher::new(&kb);
        let mut store = CheckRecordStore::new();

        store.create(&matcher, "John Doe", meds(&["Warfarin", "Aspirin"]), None).unwrap();
        store.create(&matcher, "Jane Roe", meds(&["Digoxin", "Amiodarone"]), None).unwrap();
        store.create(&matcher, "john doe", meds(&["Digoxin", "Aspirin"]), None).unwrap();

        let ids: Vec<u64> = store.for_patient("JOHN DOE").map(|r| r.id().0).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_fixed_clock_gives_reproducible_hashes() {
        let kb = setup_kb();
        let matcher = InteractionMatcher::new(&kb);
        let mut store_a = fixed_store();
        let mut store_b = fixed_store();

        let a = store_a
            .create(&matcher, "John Doe", meds(&["Warfarin", "Aspirin"]), None)
            .unwrap();
        let b = store_b
            .create(&matcher, "John Doe", meds(&["Warfarin", "Aspirin"]), None)
            .unwrap();
        assert_eq!(a.record_hash(), b.record_hash());
    }

    #[test]
    fn test_verify_chain() {
        let kb = setup_kb();
        let matcher = InteractionMatcher::new(&kb);
        let mut store = fixed_store();

        assert!(store.verify_chain().valid);
        assert_eq!(store.head_hash(), GENESIS_HASH);

        for _ in 0..3 {
            store
                .create(&matcher, "John Doe", meds(&["Warfarin", "Aspirin"]), None)
                .unwrap();
        }
        let result = store.verify_chain();
        assert!(result.valid);
        assert_eq!(result.records_checked, 3);
    }
}
