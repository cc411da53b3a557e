//! Audit export of the rule set and full check history.

use serde::{Deserialize, Serialize};

use crate::config::APP_VERSION;
use crate::knowledge::KnowledgeBase;
use crate::records::CheckRecordStore;

use super::{FlatCheckRecord, FlatInteractionRule};

/// Audit export metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditMetadata {
    /// Export format version
    pub format_version: String,
    /// Library version that produced the export
    pub generator_version: String,
    /// Unique export identifier
    pub export_id: String,
    /// Export timestamp
    pub exported_at: String,
    /// Hash algorithm used for the record chain
    pub hash_algorithm: String,
    /// Hash of the most recent record
    pub chain_head: String,
    /// Whether the chain verified at export time
    pub chain_valid: bool,
    /// Number of check records
    pub record_count: usize,
    /// Exporting system identifier
    pub system_id: Option<String>,
}

/// Full audit export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    pub metadata: AuditMetadata,
    /// Rules in publication order
    pub rules: Vec<FlatInteractionRule>,
    /// Check records in creation order
    pub records: Vec<FlatCheckRecord>,
}

impl AuditExport {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Audit exporter.
pub struct AuditExporter<'a> {
    kb: &'a KnowledgeBase,
    store: &'a CheckRecordStore,
    system_id: Option<String>,
}

impl<'a> AuditExporter<'a> {
    /// Create a new audit exporter.
    pub fn new(kb: &'a KnowledgeBase, store: &'a CheckRecordStore) -> Self {
        Self {
            kb,
            store,
            system_id: None,
        }
    }

    /// Set the system identifier for exports.
    pub fn with_system_id(mut self, system_id: Option<String>) -> Self {
        self.system_id = system_id;
        self
    }

    /// Export every rule and record.
    pub fn export_all(&self) -> AuditExport {
        let verification = self.store.verify_chain();
        let mut records: Vec<FlatCheckRecord> = self.store.list().map(FlatCheckRecord::from).collect();
        records.reverse();

        AuditExport {
            metadata: AuditMetadata {
                format_version: "1.0".to_string(),
                generator_version: APP_VERSION.to_string(),
                export_id: uuid::Uuid::new_v4().to_string(),
                exported_at: chrono::Utc::now().to_rfc3339(),
                hash_algorithm: "SHA-256".to_string(),
                chain_head: self.store.head_hash().to_string(),
                chain_valid: verification.valid,
                record_count: records.len(),
                system_id: self.system_id.clone(),
            },
            rules: self.kb.list_rules().map(FlatInteractionRule::from).collect(),
            records,
        }
    }
}
