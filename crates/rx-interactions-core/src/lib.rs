//! Rx-Interactions Core Library
//!
//! Drug-interaction checking for pharmacy operations, with an immutable,
//! hash-chained history of every check performed.
//!
//! # Architecture
//!
//! ```text
//! Curator rules ──► KnowledgeBase (pair index)
//!                         │
//! Patient + medications ──► InteractionMatcher ──► matched rules
//!                                                      │
//!                                      ┌───────────────▼───────────────┐
//!                                      │       CheckRecordStore        │
//!                                      │  append-only, SHA-256 chain   │
//!                                      └───────────────┬───────────────┘
//!                                                      │
//!                                  ┌───────────────────┴───────────────┐
//!                                  ▼                                   ▼
//!                           Stats reporter                       Audit export
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (InteractionRule, CheckRecord, Severity)
//! - [`knowledge`]: Rule store with symmetric, case-normalized pair lookup
//! - [`matcher`]: Pairwise matching of a medication list
//! - [`records`]: Append-only check record store and audit chain
//! - [`stats`]: Aggregate counts for display
//! - [`export`]: Flat records and audit export
//! - [`config`]: Checker configuration
//! - [`logging`]: Tracing setup

pub mod config;
pub mod export;
pub mod knowledge;
pub mod logging;
pub mod matcher;
pub mod models;
pub mod records;
pub mod stats;

// Re-export commonly used types
pub use config::CheckerConfig;
pub use knowledge::{KnowledgeBase, KnowledgeError, Normalizer};
pub use matcher::InteractionMatcher;
pub use models::{CheckId, CheckRecord, InteractionRule, NewRule, RuleId, Severity};
pub use records::{CheckRecordStore, ValidationError};
pub use stats::{InteractionStats, InteractionStatsReporter};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex, RwLock};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum InteractionError {
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Duplicate rule: {0}")]
    DuplicateRule(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<KnowledgeError> for InteractionError {
    fn from(e: KnowledgeError) -> Self {
        match e {
            KnowledgeError::InvalidRule(_) => InteractionError::InvalidRule(e.to_string()),
            KnowledgeError::DuplicateRule { .. } => InteractionError::DuplicateRule(e.to_string()),
            KnowledgeError::Json(_) => InteractionError::Serialization(e.to_string()),
        }
    }
}

impl From<ValidationError> for InteractionError {
    fn from(e: ValidationError) -> Self {
        InteractionError::Validation(e.to_string())
    }
}

impl From<config::ConfigError> for InteractionError {
    fn from(e: config::ConfigError) -> Self {
        InteractionError::Configuration(e.to_string())
    }
}

impl From<serde_json::Error> for InteractionError {
    fn from(e: serde_json::Error) -> Self {
        InteractionError::Serialization(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for InteractionError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        InteractionError::Lock(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Create a checker with an empty knowledge base and default settings.
#[uniffi::export]
pub fn new_interaction_checker() -> Arc<InteractionChecker> {
    Arc::new(InteractionChecker::new(CheckerConfig::default()))
}

/// Install the global tracing subscriber; later calls are no-ops.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    let filter = filter.unwrap_or_else(config::default_log_filter);
    logging::init_tracing(&filter)
}

/// Create a checker from a JSON configuration.
#[uniffi::export]
pub fn new_interaction_checker_with_config(
    config_json: String,
) -> Result<Arc<InteractionChecker>, InteractionError> {
    let config = CheckerConfig::from_json(&config_json)?;
    logging::init_tracing(&config.log_filter);
    tracing::info!(version = config::APP_VERSION, "interaction checker starting");
    Ok(Arc::new(InteractionChecker::new(config)))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe checker for FFI.
///
/// The knowledge base is read-mostly and sits behind a `RwLock`; the record
/// store is single-writer behind a `Mutex`, which also serializes record ids
/// in global creation order.
#[derive(uniffi::Object)]
pub struct InteractionChecker {
    kb: RwLock<KnowledgeBase>,
    store: Mutex<CheckRecordStore>,
    config: CheckerConfig,
}

impl InteractionChecker {
    /// Create a checker around existing stores.
    pub fn from_parts(kb: KnowledgeBase, store: CheckRecordStore, config: CheckerConfig) -> Self {
        Self {
            kb: RwLock::new(kb),
            store: Mutex::new(store),
            config,
        }
    }

    fn new(config: CheckerConfig) -> Self {
        Self::from_parts(KnowledgeBase::new(), CheckRecordStore::new(), config)
    }
}

#[uniffi::export]
impl InteractionChecker {
    // =========================================================================
    // Knowledge Base Operations
    // =========================================================================

    /// Publish an interaction rule; returns its id.
    pub fn add_rule(&self, rule: FfiNewRule) -> Result<u64, InteractionError> {
        let rule = NewRule::try_from(rule)?;
        let mut kb = self.kb.write()?;
        Ok(kb.add_rule(rule)?.0)
    }

    /// Publish a JSON array of rules; returns the number published.
    pub fn import_rules_json(&self, json: String) -> Result<u32, InteractionError> {
        let mut kb = self.kb.write()?;
        let results = kb.import_json(&json)?;
        Ok(results.iter().filter(|r| r.is_ok()).count() as u32)
    }

    /// List all rules in publication order.
    pub fn list_rules(&self) -> Result<Vec<FfiInteractionRule>, InteractionError> {
        let kb = self.kb.read()?;
        Ok(kb.list_rules().map(FfiInteractionRule::from).collect())
    }

    /// Known drug names close to `name`, best first.
    pub fn suggest_drug(&self, name: String) -> Result<Vec<String>, InteractionError> {
        let kb = self.kb.read()?;
        Ok(kb
            .suggest(
                &name,
                self.config.suggestion_threshold,
                self.config.max_suggestions,
            )
            .into_iter()
            .map(|s| s.name)
            .collect())
    }

    // =========================================================================
    // Check Operations
    // =========================================================================

    /// Match a medication list without recording it.
    pub fn check(&self, medications: Vec<String>) -> Result<Vec<FfiInteractionRule>, InteractionError> {
        let kb = self.kb.read()?;
        let matcher = InteractionMatcher::new(&kb);
        Ok(matcher
            .check(medications.as_slice())
            .into_iter()
            .map(FfiInteractionRule::from)
            .collect())
    }

    /// Run a check and retain it as an immutable record.
    pub fn create_check_record(
        &self,
        patient_name: String,
        medications: Vec<String>,
        notes: Option<String>,
    ) -> Result<FfiCheckRecord, InteractionError> {
        let kb = self.kb.read()?;
        let mut store = self.store.lock()?;
        let matcher = InteractionMatcher::new(&kb);
        let record = store.create(&matcher, &patient_name, medications, notes)?;
        Ok(FfiCheckRecord::from(&record))
    }

    /// All check records, most recent first.
    pub fn list_check_records(&self) -> Result<Vec<FfiCheckRecord>, InteractionError> {
        let store = self.store.lock()?;
        Ok(store.list().map(FfiCheckRecord::from).collect())
    }

    // =========================================================================
    // Reporting Operations
    // =========================================================================

    /// Current aggregate counts.
    pub fn get_stats(&self) -> Result<FfiInteractionStats, InteractionError> {
        let kb = self.kb.read()?;
        let store = self.store.lock()?;
        let stats = InteractionStatsReporter::new(&kb, &store).report();
        Ok(stats.into())
    }

    /// Whether the record history re-hashes cleanly.
    pub fn verify_audit_chain(&self) -> Result<bool, InteractionError> {
        let store = self.store.lock()?;
        Ok(store.verify_chain().valid)
    }

    /// Export rules and records as JSON.
    pub fn export_audit_json(&self) -> Result<String, InteractionError> {
        let kb = self.kb.read()?;
        let store = self.store.lock()?;
        let export = export::AuditExporter::new(&kb, &store)
            .with_system_id(self.config.system_id.clone())
            .export_all();
        Ok(export.to_json()?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe rule submission.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewRule {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: String,
    pub description: String,
    pub mechanism: String,
    pub clinical_effects: String,
    pub management: String,
    pub reference: String,
}

impl TryFrom<FfiNewRule> for NewRule {
    type Error = InteractionError;

    fn try_from(rule: FfiNewRule) -> Result<Self, Self::Error> {
        let severity: Severity = rule
            .severity
            .parse()
            .map_err(|e: models::ParseSeverityError| InteractionError::InvalidRule(e.to_string()))?;
        Ok(NewRule {
            drug_a: rule.drug_a,
            drug_b: rule.drug_b,
            severity,
            description: rule.description,
            mechanism: rule.mechanism,
            clinical_effects: rule.clinical_effects,
            management: rule.management,
            reference: rule.reference,
        })
    }
}

/// FFI-safe published rule.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInteractionRule {
    pub id: u64,
    pub drug_a: String,
    pub drug_b: String,
    pub severity: String,
    pub description: String,
    pub mechanism: String,
    pub clinical_effects: String,
    pub management: String,
    pub reference: String,
}

impl From<&InteractionRule> for FfiInteractionRule {
    fn from(rule: &InteractionRule) -> Self {
        Self {
            id: rule.id().0,
            drug_a: rule.drug_a().to_string(),
            drug_b: rule.drug_b().to_string(),
            severity: rule.severity().label().to_string(),
            description: rule.description().to_string(),
            mechanism: rule.mechanism().to_string(),
            clinical_effects: rule.clinical_effects().to_string(),
            management: rule.management().to_string(),
            reference: rule.reference().to_string(),
        }
    }
}

/// FFI-safe check record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCheckRecord {
    pub id: u64,
    pub patient_name: String,
    pub medications: Vec<String>,
    pub matched_interactions: Vec<FfiInteractionRule>,
    pub check_date: String,
    pub notes: Option<String>,
    pub record_hash: String,
}

impl From<&CheckRecord> for FfiCheckRecord {
    fn from(record: &CheckRecord) -> Self {
        Self {
            id: record.id().0,
            patient_name: record.patient_name().to_string(),
            medications: record.medications().to_vec(),
            matched_interactions: record
                .matched_interactions()
                .iter()
                .map(FfiInteractionRule::from)
                .collect(),
            check_date: record.check_date().to_rfc3339(),
            notes: record.notes().map(String::from),
            record_hash: record.record_hash().to_string(),
        }
    }
}

/// FFI-safe statistics.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInteractionStats {
    pub total_rules: u64,
    pub high_severity_rule_count: u64,
    pub total_checks_performed: u64,
    pub total_interactions_found: u64,
}

impl From<InteractionStats> for FfiInteractionStats {
    fn from(stats: InteractionStats) -> Self {
        Self {
            total_rules: stats.total_rules as u64,
            high_severity_rule_count: stats.high_severity_rule_count as u64,
            total_checks_performed: stats.total_checks_performed as u64,
            total_interactions_found: stats.total_interactions_found as u64,
        }
    }
}
