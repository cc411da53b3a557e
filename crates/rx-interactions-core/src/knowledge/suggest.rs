//! "Did you mean" suggestions for medication names.
//!
//! Advisory only: the matcher never substitutes a suggestion for what
//! was submitted.

use serde::Serialize;
use strsim::jaro_winkler;

/// A known drug name close to a submitted one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugSuggestion {
    /// Canonical drug name from the knowledge base
    pub name: String,
    /// Jaro-Winkler similarity in [0, 1]
    pub similarity: f64,
}

/// Rank `candidates` by similarity to `query`, best first.
///
/// `query` must already be canonical. Exact matches are skipped, ties are
/// broken alphabetically.
pub(crate) fn rank<'a, I>(query: &str, candidates: I, threshold: f64, limit: usize) -> Vec<DrugSuggestion>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut scored: Vec<DrugSuggestion> = candidates
        .into_iter()
        .filter(|name| name.as_str() != query)
        .map(|name| DrugSuggestion {
            name: name.clone(),
            similarity: jaro_winkler(query, name),
        })
        .filter(|s| s.similarity >= threshold)
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_misspelling_ranks_first() {
        let known = names(&["warfarin", "aspirin", "digoxin"]);
        let results = rank("warfarn", &known, 0.8, 3);
        assert_eq!(results[0].name, "warfarin");
        assert!(results[0].similarity > 0.9);
    }

    #[test]
    fn test_threshold_filters() {
        let known = names(&["warfarin", "aspirin"]);
        let results = rank("zzz", &known, 0.8, 3);
        assert!(results.is_empty());
    }

    #[test]
    fn test_exact_excluded_and_limit() {
        let known = names(&["aspirin", "aspirine", "aspirina"]);
        let results = rank("aspirin", &known, 0.5, 1);
        assert_eq!(results.len(), 1);
        assert_ne!(results[0].name, "aspirin");
    }
}
