//! Pairwise interaction matcher.
//!
//! Pipeline: Normalize → Deduplicate → Enumerate pairs → Look up → Order

use std::collections::HashSet;

use tracing::debug;

use crate::knowledge::{KnowledgeBase, PairKey};
use crate::models::{match_order, InteractionRule};

/// Resolves a medication list against a knowledge base.
pub struct InteractionMatcher<'a> {
    kb: &'a KnowledgeBase,
}

impl<'a> InteractionMatcher<'a> {
    /// Create a new matcher.
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self { kb }
    }

    pub fn knowledge_base(&self) -> &'a KnowledgeBase {
        self.kb
    }

    /// All rules matching some pair of the given medications.
    ///
    /// The list is treated as a set: casing, whitespace and repeats do not
    /// matter, and blank entries are ignored. Fewer than two distinct
    /// medications yields an empty result. Output is ordered by severity
    /// descending, then rule id ascending.
    pub fn check<S: AsRef<str>>(&self, medications: &[S]) -> Vec<&'a InteractionRule> {
        let distinct = self.distinct_canonical(medications);
        if distinct.len() < 2 {
            return Vec::new();
        }

        let mut matches = Vec::new();
        for (i, a) in distinct.iter().enumerate() {
            for b in &distinct[i + 1..] {
                // Distinct names always form a valid pair
                if let Some(key) = PairKey::new(a.clone(), b.clone()) {
                    if let Some(rule) = self.kb.find_by_key(&key) {
                        matches.push(rule);
                    }
                }
            }
        }

        matches.sort_by(|a, b| match_order(a, b));
        debug!(
            distinct = distinct.len(),
            pairs = distinct.len() * (distinct.len() - 1) / 2,
            matched = matches.len(),
            "interaction check complete"
        );
        matches
    }

    /// Distinct submitted names that no rule mentions, trimmed, in
    /// submission order.
    pub fn unknown_medications<S: AsRef<str>>(&self, medications: &[S]) -> Vec<String> {
        let normalizer = self.kb.normalizer();
        let mut seen = HashSet::new();
        medications
            .iter()
            .filter_map(|m| {
                let canonical = normalizer.canonicalize(m.as_ref())?;
                if self.kb.contains_canonical(&canonical) || !seen.insert(canonical) {
                    None
                } else {
                    Some(m.as_ref().trim().to_string())
                }
            })
            .collect()
    }

    fn distinct_canonical<S: AsRef<str>>(&self, medications: &[S]) -> Vec<String> {
        let normalizer = self.kb.normalizer();
        let mut seen = HashSet::new();
        medications
            .iter()
            .filter_map(|m| normalizer.canonicalize(m.as_ref()))
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }
}
