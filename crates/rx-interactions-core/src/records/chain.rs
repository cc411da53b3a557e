//! Hash chain sealing check records into a tamper-evident history.
//!
//! record_hash = SHA-256(previous_hash ‖ id ‖ patient ‖ medications ‖
//! matched rule ids ‖ check date ‖ notes), each field length-prefixed.

use chrono::SecondsFormat;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::{CheckId, CheckRecord, UnsealedRecord};

/// Previous-hash value for the first record in a store.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Result of re-hashing a record history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainVerification {
    /// Whether every record re-hashes to its stored hash and links to its predecessor
    pub valid: bool,
    /// Number of records checked
    pub records_checked: usize,
    /// First record that failed verification
    pub first_broken: Option<CheckId>,
}

/// Compute the hash sealing `record` after `previous_hash`.
pub(crate) fn seal_hash(previous_hash: &str, record: &UnsealedRecord) -> String {
    let rule_ids: Vec<u64> = record.matched_interactions.iter().map(|r| r.id().0).collect();
    digest(DigestInput {
        previous_hash,
        id: record.id.0,
        patient_name: &record.patient_name,
        medications: &record.medications,
        rule_ids: &rule_ids,
        check_date: &record.check_date.to_rfc3339_opts(SecondsFormat::Nanos, true),
        notes: record.notes.as_deref(),
    })
}

fn recompute(record: &CheckRecord) -> String {
    let rule_ids: Vec<u64> = record.matched_rule_ids().into_iter().map(|id| id.0).collect();
    digest(DigestInput {
        previous_hash: record.previous_hash(),
        id: record.id().0,
        patient_name: record.patient_name(),
        medications: record.medications(),
        rule_ids: &rule_ids,
        check_date: &record.check_date().to_rfc3339_opts(SecondsFormat::Nanos, true),
        notes: record.notes(),
    })
}

struct DigestInput<'a> {
    previous_hash: &'a str,
    id: u64,
    patient_name: &'a str,
    medications: &'a [String],
    rule_ids: &'a [u64],
    check_date: &'a str,
    notes: Option<&'a str>,
}

fn digest(input: DigestInput<'_>) -> String {
    let mut hasher = Sha256::new();
    write_field(&mut hasher, input.previous_hash.as_bytes());
    hasher.update(input.id.to_be_bytes());
    write_field(&mut hasher, input.patient_name.as_bytes());

    hasher.update((input.medications.len() as u64).to_be_bytes());
    for medication in input.medications {
        write_field(&mut hasher, medication.as_bytes());
    }

    hasher.update((input.rule_ids.len() as u64).to_be_bytes());
    for id in input.rule_ids {
        hasher.update(id.to_be_bytes());
    }

    write_field(&mut hasher, input.check_date.as_bytes());
    match input.notes {
        Some(notes) => {
            hasher.update([1u8]);
            write_field(&mut hasher, notes.as_bytes());
        }
        None => hasher.update([0u8]),
    }

    hex::encode(hasher.finalize())
}

fn write_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

/// Verify records given in creation order.
pub fn verify(records: &[CheckRecord]) -> ChainVerification {
    let mut expected_previous = GENESIS_HASH;
    for record in records {
        if record.previous_hash() != expected_previous || recompute(record) != record.record_hash() {
            return ChainVerification {
                valid: false,
                records_checked: records.len(),
                first_broken: Some(record.id()),
            };
        }
        expected_previous = record.record_hash();
    }

    ChainVerification {
        valid: true,
        records_checked: records.len(),
        first_broken: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn unsealed(id: u64, notes: Option<&str>) -> UnsealedRecord {
        UnsealedRecord {
            id: CheckId(id),
            patient_name: "John Doe".into(),
            medications: vec!["Warfarin".into(), "Aspirin".into()],
            matched_interactions: Vec::new(),
            check_date: chrono::Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            notes: notes.map(String::from),
        }
    }

    fn seal(previous: &str, record: UnsealedRecord) -> CheckRecord {
        let hash = seal_hash(previous, &record);
        CheckRecord::seal(record, previous.to_string(), hash)
    }

    #[test]
    fn test_deterministic_hash() {
        let a = seal_hash(GENESIS_HASH, &unsealed(1, None));
        let b = seal_hash(GENESIS_HASH, &unsealed(1, None));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hash_covers_fields() {
        let base = seal_hash(GENESIS_HASH, &unsealed(1, None));
        assert_ne!(base, seal_hash(GENESIS_HASH, &unsealed(2, None)));
        assert_ne!(base, seal_hash(GENESIS_HASH, &unsealed(1, Some(""))));
        assert_ne!(base, seal_hash("ff", &unsealed(1, None)));
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let mut joined = unsealed(1, None);
        joined.medications = vec!["WarfarinAspirin".into()];
        assert_ne!(
            seal_hash(GENESIS_HASH, &joined),
            seal_hash(GENESIS_HASH, &unsealed(1, None))
        );
    }

    #[test]
    fn test_verify_valid_chain() {
        let first = seal(GENESIS_HASH, unsealed(1, None));
        let second = seal(first.record_hash(), unsealed(2, Some("follow-up")));

        let result = verify(&[first, second]);
        assert!(result.valid);
        assert_eq!(result.records_checked, 2);
        assert_eq!(result.first_broken, None);
    }

    #[test]
    fn test_verify_detects_tampered_content() {
        let first = seal(GENESIS_HASH, unsealed(1, None));
        let hash = first.record_hash().to_string();
        // Same hash, different content
        let forged = CheckRecord::seal(unsealed(1, Some("edited")), GENESIS_HASH.into(), hash);

        let result = verify(&[forged]);
        assert!(!result.valid);
        assert_eq!(result.first_broken, Some(CheckId(1)));
    }

    #[test]
    fn test_verify_detects_broken_link() {
        let first = seal(GENESIS_HASH, unsealed(1, None));
        let second = seal(GENESIS_HASH, unsealed(2, None));

        let result = verify(&[first, second]);
        assert!(!result.valid);
        assert_eq!(result.first_broken, Some(CheckId(2)));
    }
}
