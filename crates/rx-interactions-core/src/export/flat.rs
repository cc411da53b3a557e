//! Flat records for persistence by the embedding application.
//!
//! Matched interactions are stored as rule ids, medications as an ordered
//! list of names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CheckId, CheckRecord, InteractionRule, RuleId, Severity};

/// Flat form of an interaction rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatInteractionRule {
    pub id: RuleId,
    pub drug_a: String,
    pub drug_b: String,
    pub severity: Severity,
    pub description: String,
    pub mechanism: String,
    pub clinical_effects: String,
    pub management: String,
    pub reference: String,
}

impl From<&InteractionRule> for FlatInteractionRule {
    fn from(rule: &InteractionRule) -> Self {
        Self {
            id: rule.id(),
            drug_a: rule.drug_a().to_string(),
            drug_b: rule.drug_b().to_string(),
            severity: rule.severity(),
            description: rule.description().to_string(),
            mechanism: rule.mechanism().to_string(),
            clinical_effects: rule.clinical_effects().to_string(),
            management: rule.management().to_string(),
            reference: rule.reference().to_string(),
        }
    }
}

/// Flat form of a check record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatCheckRecord {
    pub id: CheckId,
    pub patient_name: String,
    pub medications: Vec<String>,
    pub matched_interactions: Vec<RuleId>,
    pub check_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub previous_hash: String,
    pub record_hash: String,
}

impl From<&CheckRecord> for FlatCheckRecord {
    fn from(record: &CheckRecord) -> Self {
        Self {
            id: record.id(),
            patient_name: record.patient_name().to_string(),
            medications: record.medications().to_vec(),
            matched_interactions: record.matched_rule_ids(),
            check_date: record.check_date(),
            notes: record.notes().map(String::from),
            previous_hash: record.previous_hash().to_string(),
            record_hash: record.record_hash().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use crate::matcher::InteractionMatcher;
    use crate::models::NewRule;
    use crate::records::CheckRecordStore;

    #[test]
    fn test_flat_check_record_json_shape() {
        let mut kb = KnowledgeBase::new();
        kb.add_rule(NewRule::new("Warfarin", "Aspirin", Severity::Major)).unwrap();
        let mut store = CheckRecordStore::new();
        let record = store
            .create(
                &InteractionMatcher::new(&kb),
                "John Doe",
                vec!["Warfarin".into(), "Aspirin".into()],
                Some("Counselled on bleeding signs".into()),
            )
            .unwrap();

        let flat = FlatCheckRecord::from(&record);
        let value = serde_json::to_value(&flat).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["medications"], serde_json::json!(["Warfarin", "Aspirin"]));
        assert_eq!(value["matched_interactions"], serde_json::json!([1]));
        assert_eq!(value["notes"], "Counselled on bleeding signs");

        let parsed: FlatCheckRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, flat);
    }

    #[test]
    fn test_flat_rule_fields() {
        let mut kb = KnowledgeBase::new();
        kb.add_rule(
            NewRule::new("Digoxin", "Amiodarone", Severity::Major)
                .with_mechanism("P-gp inhibition")
                .with_management("Reduce digoxin dose by 50%"),
        )
        .unwrap();

        let rule = kb.list_rules().next().unwrap();
        let flat = FlatInteractionRule::from(rule);
        assert_eq!(flat.id, RuleId(1));
        assert_eq!(flat.severity, Severity::Major);
        assert_eq!(flat.mechanism, "P-gp inhibition");
        assert_eq!(flat.management, "Reduce digoxin dose by 50%");
    }
}
