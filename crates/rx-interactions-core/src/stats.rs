//! Aggregate counts over the knowledge base and check history.
//!
//! Recomputed on every call; nothing is cached.

use serde::Serialize;

use crate::knowledge::KnowledgeBase;
use crate::models::Severity;
use crate::records::CheckRecordStore;

/// Rule count for one severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityCount {
    pub severity: Severity,
    pub count: usize,
}

/// Snapshot of interaction statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionStats {
    /// Published rules
    pub total_rules: usize,
    /// Rules at Major or Contraindicated
    pub high_severity_rule_count: usize,
    /// Check records created
    pub total_checks_performed: usize,
    /// Sum of matched interactions across all check records
    pub total_interactions_found: usize,
    /// Rule counts per severity, lowest severity first
    pub severity_breakdown: Vec<SeverityCount>,
}

/// Read-only view deriving statistics from the two stores.
pub struct InteractionStatsReporter<'a> {
    kb: &'a KnowledgeBase,
    store: &'a CheckRecordStore,
}

impl<'a> InteractionStatsReporter<'a> {
    pub fn new(kb: &'a KnowledgeBase, store: &'a CheckRecordStore) -> Self {
        Self { kb, store }
    }

    pub fn total_rules(&self) -> usize {
        self.kb.len()
    }

    pub fn high_severity_rule_count(&self) -> usize {
        self.kb
            .list_rules()
            .filter(|r| r.severity().is_high())
            .count()
    }

    pub fn total_checks_performed(&self) -> usize {
        self.store.len()
    }

    pub fn total_interactions_found(&self) -> usize {
        self.store
            .list()
            .map(|r| r.matched_interactions().len())
            .sum()
    }

    pub fn severity_breakdown(&self) -> Vec<SeverityCount> {
        let mut counts = [0usize; 4];
        for rule in self.kb.list_rules() {
            counts[rule.severity() as usize] += 1;
        }
        Severity::ALL
            .iter()
            .zip(counts)
            .map(|(&severity, count)| SeverityCount { severity, count })
            .collect()
    }

    /// Build the full snapshot.
    pub fn report(&self) -> InteractionStats {
        InteractionStats {
            total_rules: self.total_rules(),
            high_severity_rule_count: self.high_severity_rule_count(),
            total_checks_performed: self.total_checks_performed(),
            total_interactions_found: self.total_interactions_found(),
            severity_breakdown: self.severity_breakdown(),
        }
    }
}
