//! Interaction rule models.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Severity;

/// Identifier assigned to a rule when it is published to the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IR-{:04}", self.0)
    }
}

/// A rule as submitted by a curator, before it has an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRule {
    /// First drug of the pair (order is not significant)
    pub drug_a: String,
    /// Second drug of the pair
    pub drug_b: String,
    /// Clinical severity
    pub severity: Severity,
    /// Short summary of the interaction
    #[serde(default)]
    pub description: String,
    /// Pharmacological mechanism
    #[serde(default)]
    pub mechanism: String,
    /// Expected clinical effects
    #[serde(default)]
    pub clinical_effects: String,
    /// Recommended management
    #[serde(default)]
    pub management: String,
    /// Literature or monograph reference
    #[serde(default)]
    pub reference: String,
}

impl NewRule {
    /// Create a rule with the required fields and empty clinical metadata.
    pub fn new(drug_a: impl Into<String>, drug_b: impl Into<String>, severity: Severity) -> Self {
        Self {
            drug_a: drug_a.into(),
            drug_b: drug_b.into(),
            severity,
            description: String::new(),
            mechanism: String::new(),
            clinical_effects: String::new(),
            management: String::new(),
            reference: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_mechanism(mut self, mechanism: impl Into<String>) -> Self {
        self.mechanism = mechanism.into();
        self
    }

    pub fn with_clinical_effects(mut self, clinical_effects: impl Into<String>) -> Self {
        self.clinical_effects = clinical_effects.into();
        self
    }

    pub fn with_management(mut self, management: impl Into<String>) -> Self {
        self.management = management.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }
}

/// A published interaction rule. Read-only once in the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionRule {
    id: RuleId,
    drug_a: String,
    drug_b: String,
    severity: Severity,
    description: String,
    mechanism: String,
    clinical_effects: String,
    management: String,
    reference: String,
}

impl InteractionRule {
    /// Publish a submitted rule under the given id.
    pub(crate) fn publish(id: RuleId, rule: NewRule) -> Self {
        Self {
            id,
            drug_a: rule.drug_a.trim().to_string(),
            drug_b: rule.drug_b.trim().to_string(),
            severity: rule.severity,
            description: rule.description,
            mechanism: rule.mechanism,
            clinical_effects: rule.clinical_effects,
            management: rule.management,
            reference: rule.reference,
        }
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    /// First drug name as the curator entered it.
    pub fn drug_a(&self) -> &str {
        &self.drug_a
    }

    /// Second drug name as the curator entered it.
    pub fn drug_b(&self) -> &str {
        &self.drug_b
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn mechanism(&self) -> &str {
        &self.mechanism
    }

    pub fn clinical_effects(&self) -> &str {
        &self.clinical_effects
    }

    pub fn management(&self) -> &str {
        &self.management
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }
}

/// Severity descending, then rule id ascending.
pub fn match_order(a: &InteractionRule, b: &InteractionRule) -> std::cmp::Ordering {
    b.severity.cmp(&a.severity).then_with(|| a.id.cmp(&b.id))
}
