//! Check record models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{InteractionRule, RuleId};

/// Identifier of a check record, increasing in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(pub u64);

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IC-{:04}", self.0)
    }
}

/// The immutable result of one interaction check.
///
/// Only the record store constructs these; there are no setters. A
/// correction is a new record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRecord {
    id: CheckId,
    patient_name: String,
    medications: Vec<String>,
    matched_interactions: Vec<InteractionRule>,
    check_date: DateTime<Utc>,
    notes: Option<String>,
    previous_hash: String,
    record_hash: String,
}

/// Fields of a record before it is sealed into the audit chain.
pub(crate) struct UnsealedRecord {
    pub id: CheckId,
    pub patient_name: String,
    pub medications: Vec<String>,
    pub matched_interactions: Vec<InteractionRule>,
    pub check_date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl CheckRecord {
    pub(crate) fn seal(record: UnsealedRecord, previous_hash: String, record_hash: String) -> Self {
        Self {
            id: record.id,
            patient_name: record.patient_name,
            medications: record.medications,
            matched_interactions: record.matched_interactions,
            check_date: record.check_date,
            notes: record.notes,
            previous_hash,
            record_hash,
        }
    }

    pub fn id(&self) -> CheckId {
        self.id
    }

    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    /// Medications exactly as submitted, duplicates included.
    pub fn medications(&self) -> &[String] {
        &self.medications
    }

    /// Matched rules, severity descending then rule id ascending.
    pub fn matched_interactions(&self) -> &[InteractionRule] {
        &self.matched_interactions
    }

    /// Ids of the matched rules, in match order.
    pub fn matched_rule_ids(&self) -> Vec<RuleId> {
        self.matched_interactions.iter().map(|r| r.id()).collect()
    }

    pub fn check_date(&self) -> DateTime<Utc> {
        self.check_date
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Hash of the record created immediately before this one.
    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    /// Hash sealing this record into the audit chain.
    pub fn record_hash(&self) -> &str {
        &self.record_hash
    }

    /// Whether any matched interaction is Major or worse.
    pub fn has_high_severity(&self) -> bool {
        self.matched_interactions
            .iter()
            .any(|r| r.severity().is_high())
    }
}
