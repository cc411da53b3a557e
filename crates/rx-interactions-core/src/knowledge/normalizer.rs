//! Medication name normalizer.
//!
//! Handles:
//! - Whitespace trimming and collapsing ("  warfarin   sodium " → "warfarin sodium")
//! - Case folding (Warfarin → warfarin)
//! - Optional alias expansion (coumadin → warfarin)

use std::collections::HashMap;

/// Normalizer for medication names.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    /// Alias map: canonical alias → canonical generic name
    aliases: HashMap<String, String>,
}

impl Normalizer {
    /// Create a normalizer with no aliases (case and whitespace folding only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer preloaded with common brand → generic aliases.
    pub fn with_common_brands() -> Self {
        let mut normalizer = Self::new();
        for (brand, generic) in COMMON_BRANDS {
            normalizer.add_alias(brand, generic);
        }
        normalizer
    }

    /// Canonical form of a medication name, or `None` if it is blank.
    pub fn canonicalize(&self, name: &str) -> Option<String> {
        let folded = fold(name)?;
        Some(self.aliases.get(&folded).cloned().unwrap_or(folded))
    }

    /// Add an alias mapping. Blank names are ignored.
    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        if let (Some(alias), Some(canonical)) = (fold(alias), fold(canonical)) {
            if alias != canonical {
                self.aliases.insert(alias, canonical);
            }
        }
    }

    /// Number of registered aliases.
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

fn fold(name: &str) -> Option<String> {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}

const COMMON_BRANDS: &[(&str, &str)] = &[
    // Anticoagulants / antiplatelets
    ("coumadin", "warfarin"),
    ("jantoven", "warfarin"),
    ("plavix", "clopidogrel"),
    ("bayer", "aspirin"),
    ("eliquis", "apixaban"),
    ("xarelto", "rivaroxaban"),
    // Cardiac
    ("lanoxin", "digoxin"),
    ("cordarone", "amiodarone"),
    ("pacerone", "amiodarone"),
    ("lopressor", "metoprolol"),
    ("toprol", "metoprolol"),
    ("norvasc", "amlodipine"),
    // Statins
    ("zocor", "simvastatin"),
    ("lipitor", "atorvastatin"),
    // Antibiotics / antifungals
    ("biaxin", "clarithromycin"),
    ("cipro", "ciprofloxacin"),
    ("diflucan", "fluconazole"),
    ("flagyl", "metronidazole"),
    // CNS
    ("prozac", "fluoxetine"),
    ("zoloft", "sertraline"),
    ("ultram", "tramadol"),
    ("lithobid", "lithium"),
    // Other
    ("motrin", "ibuprofen"),
    ("advil", "ibuprofen"),
    ("viagra", "sildenafil"),
    ("nitrostat", "nitroglycerin"),
];

/// Canonical key for an unordered pair of medication names.
///
/// Both names are normalized and stored sorted, so `{a, b}` and `{b, a}`
/// produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(String, String);

impl PairKey {
    /// Build a key from two canonical names. Returns `None` for a self pair.
    pub fn new(a: String, b: String) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self(a, b)),
            std::cmp::Ordering::Greater => Some(Self(b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The lexicographically smaller name.
    pub fn first(&self) -> &str {
        &self.0
    }

    /// The lexicographically larger name.
    pub fn second(&self) -> &str {
        &self.1
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0 == name || self.1 == name
    }
}
