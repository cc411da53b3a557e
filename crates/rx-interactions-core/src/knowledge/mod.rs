//! Interaction knowledge base.
//!
//! Rules are indexed by a canonical [`PairKey`], so lookup is symmetric
//! and O(1) expected regardless of the order a pair is queried in.

mod normalizer;
mod suggest;

pub use normalizer::*;
pub use suggest::*;

use std::collections::{BTreeSet, HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{InteractionRule, NewRule, RuleId};

/// Knowledge base errors.
#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Duplicate rule: {drug_a} + {drug_b} already covered by {existing}")]
    DuplicateRule {
        existing: RuleId,
        drug_a: String,
        drug_b: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type KnowledgeResult<T> = Result<T, KnowledgeError>;

#[derive(Debug)]
struct RuleEntry {
    key: PairKey,
    rule: InteractionRule,
}

/// In-memory store of published interaction rules.
#[derive(Debug)]
pub struct KnowledgeBase {
    normalizer: Normalizer,
    /// Insertion order; a rule with id `n` lives at index `n - 1`
    entries: Vec<RuleEntry>,
    by_pair: HashMap<PairKey, usize>,
    drugs: HashSet<String>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    /// Create an empty knowledge base with case/whitespace normalization only.
    pub fn new() -> Self {
        Self::with_normalizer(Normalizer::new())
    }

    /// Create an empty knowledge base with a custom normalizer.
    ///
    /// The normalizer is fixed for the lifetime of the knowledge base, since
    /// every index key is derived from it.
    pub fn with_normalizer(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            entries: Vec::new(),
            by_pair: HashMap::new(),
            drugs: HashSet::new(),
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Publish a rule and return its assigned id.
    pub fn add_rule(&mut self, rule: NewRule) -> KnowledgeResult<RuleId> {
        let key = self.pair_key_for(&rule)?;

        if let Some(&index) = self.by_pair.get(&key) {
            let existing = self.entries[index].rule.id();
            warn!(
                drug_a = %rule.drug_a,
                drug_b = %rule.drug_b,
                %existing,
                "rejected duplicate interaction rule"
            );
            return Err(KnowledgeError::DuplicateRule {
                existing,
                drug_a: rule.drug_a,
                drug_b: rule.drug_b,
            });
        }

        let id = RuleId(self.entries.len() as u64 + 1);
        let severity = rule.severity;
        self.drugs.insert(key.first().to_string());
        self.drugs.insert(key.second().to_string());
        self.by_pair.insert(key.clone(), self.entries.len());
        self.entries.push(RuleEntry {
            key,
            rule: InteractionRule::publish(id, rule),
        });

        info!(%id, %severity, "published interaction rule");
        Ok(id)
    }

    /// Validate a submitted rule and derive its canonical key.
    fn pair_key_for(&self, rule: &NewRule) -> KnowledgeResult<PairKey> {
        let a = self.normalizer.canonicalize(&rule.drug_a);
        let b = self.normalizer.canonicalize(&rule.drug_b);

        let (a, b) = match (a, b) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                warn!("rejected interaction rule with blank drug name");
                return Err(KnowledgeError::InvalidRule(
                    "drug names must not be blank".into(),
                ));
            }
        };

        PairKey::new(a, b).ok_or_else(|| {
            warn!(drug_a = %rule.drug_a, drug_b = %rule.drug_b, "rejected self-pair rule");
            KnowledgeError::InvalidRule(format!(
                "{} cannot interact with itself",
                rule.drug_a.trim()
            ))
        })
    }

    /// Find the rule for an unordered pair of medication names.
    pub fn find_rule(&self, drug_x: &str, drug_y: &str) -> Option<&InteractionRule> {
        let x = self.normalizer.canonicalize(drug_x)?;
        let y = self.normalizer.canonicalize(drug_y)?;
        self.find_by_key(&PairKey::new(x, y)?)
    }

    /// Look up a rule by an already-canonical key.
    pub fn find_by_key(&self, key: &PairKey) -> Option<&InteractionRule> {
        let found = self.by_pair.get(key).map(|&i| &self.entries[i].rule);
        debug!(a = key.first(), b = key.second(), hit = found.is_some(), "pair lookup");
        found
    }

    /// Get a rule by id.
    pub fn get_rule(&self, id: RuleId) -> Option<&InteractionRule> {
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.entries.get(index).map(|e| &e.rule)
    }

    /// All rules in publication order. Call again to restart.
    pub fn list_rules(&self) -> impl Iterator<Item = &InteractionRule> + '_ {
        self.entries.iter().map(|e| &e.rule)
    }

    /// All rules naming the given drug, in publication order.
    pub fn interactions_for<'a>(&'a self, drug: &str) -> impl Iterator<Item = &'a InteractionRule> + 'a {
        let canonical = self.normalizer.canonicalize(drug);
        self.entries
            .iter()
            .filter(move |e| canonical.as_deref().is_some_and(|c| e.key.contains(c)))
            .map(|e| &e.rule)
    }

    /// Whether any rule names this drug.
    pub fn contains_drug(&self, drug: &str) -> bool {
        self.normalizer
            .canonicalize(drug)
            .is_some_and(|c| self.drugs.contains(&c))
    }

    /// Whether any rule names this already-canonical drug name.
    pub fn contains_canonical(&self, canonical: &str) -> bool {
        self.drugs.contains(canonical)
    }

    /// Canonical names of every drug named by a rule, sorted.
    pub fn known_drugs(&self) -> Vec<String> {
        self.drugs
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Known drug names similar to `name`, best first.
    pub fn suggest(&self, name: &str, threshold: f64, limit: usize) -> Vec<DrugSuggestion> {
        match self.normalizer.canonicalize(name) {
            Some(query) => suggest::rank(&query, &self.drugs, threshold, limit),
            None => Vec::new(),
        }
    }

    /// Publish a batch of rules. One result per submitted rule, in order;
    /// a rejected rule does not stop the rest.
    pub fn import_rules(&mut self, rules: Vec<NewRule>) -> Vec<KnowledgeResult<RuleId>> {
        let total = rules.len();
        let results: Vec<_> = rules.into_iter().map(|r| self.add_rule(r)).collect();
        let published = results.iter().filter(|r| r.is_ok()).count();
        info!(total, published, "imported interaction rules");
        results
    }

    /// Publish a JSON array of rules.
    pub fn import_json(&mut self, json: &str) -> KnowledgeResult<Vec<KnowledgeResult<RuleId>>> {
        let rules: Vec<NewRule> = serde_json::from_str(json)?;
        Ok(self.import_rules(rules))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
