//! Processed-state ledger.
//!
//! One entry per source file name records the SHA-256 of the content that was
//! last synced, when that happened, and which issues the run created. A file
//! whose current hash matches its entry is skipped on the next run.
//!
//! ```text
//! { "<filename>": { "hash": "<sha256-hex>", "lastProcessed": "<ISO8601>",
//!                   "createdIssues": [{ "title": "...", "number": 1, "id": 1 }] } }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::CoreError;

/// Hex-encoded SHA-256 digest of a source document.
#[must_use]
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// An issue created on the remote tracker during a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub title: String,
    /// Repository-scoped issue number (`#42`).
    pub number: u64,
    /// Tracker-global issue id.
    pub id: u64,
}

/// Processed state of a single source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub hash: String,
    pub last_processed: DateTime<Utc>,
    #[serde(default)]
    pub created_issues: Vec<CreatedIssue>,
}

/// The full ledger, keyed by source file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl Ledger {
    /// Parse a ledger document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidLedger`] if the document is not valid JSON
    /// or does not have the ledger shape.
    pub fn from_json(document: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Render the ledger as pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidLedger`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        let mut rendered = serde_json::to_string_pretty(self)?;
        rendered.push('\n');
        Ok(rendered)
    }

    #[must_use]
    pub fn get(&self, file: &str) -> Option<&LedgerEntry> {
        self.entries.get(file)
    }

    /// Whether `file` was last processed with exactly this content hash.
    #[must_use]
    pub fn is_unchanged(&self, file: &str, hash: &str) -> bool {
        self.entries.get(file).is_some_and(|entry| entry.hash == hash)
    }

    /// Replace the entry for `file` with the outcome of a sync run.
    pub fn record(
        &mut self,
        file: &str,
        hash: String,
        processed_at: DateTime<Utc>,
        created_issues: Vec<CreatedIssue>,
    ) {
        self.entries.insert(
            file.to_string(),
            LedgerEntry {
                hash,
                last_processed: processed_at,
                created_issues,
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn processed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn empty_content_hash_matches_sha256_of_empty_string() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hash_changes_with_content() {
        assert_ne!(content_hash("## M1\n"), content_hash("## M2\n"));
        assert_eq!(content_hash("same"), content_hash("same"));
    }

    #[test]
    fn unchanged_only_when_hash_matches() {
        let mut ledger = Ledger::default();
        assert!(!ledger.is_unchanged("plan.md", "abc"));

        ledger.record("plan.md", "abc".into(), processed_at(), Vec::new());
        assert!(ledger.is_unchanged("plan.md", "abc"));
        assert!(!ledger.is_unchanged("plan.md", "def"));
        assert!(!ledger.is_unchanged("other.md", "abc"));
    }

    #[test]
    fn record_replaces_previous_entry() {
        let mut ledger = Ledger::default();
        ledger.record(
            "plan.md",
            "old".into(),
            processed_at(),
            vec![CreatedIssue {
                title: "A (Core)".into(),
                number: 1,
                id: 100,
            }],
        );
        ledger.record("plan.md", "new".into(), processed_at(), Vec::new());

        let entry = ledger.get("plan.md").unwrap();
        assert_eq!(entry.hash, "new");
        assert!(entry.created_issues.is_empty());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn json_shape_uses_camel_case_keys() {
        let mut ledger = Ledger::default();
        ledger.record(
            "feature-plan.md",
            "abc123".into(),
            processed_at(),
            vec![CreatedIssue {
                title: "[P0] Fix bug (Core)".into(),
                number: 7,
                id: 9001,
            }],
        );

        let value: serde_json::Value =
            serde_json::from_str(&ledger.to_json_pretty().unwrap()).unwrap();
        let entry = &value["feature-plan.md"];
        assert_eq!(entry["hash"], "abc123");
        assert_eq!(entry["lastProcessed"], "2025-03-14T09:30:00Z");
        assert_eq!(entry["createdIssues"][0]["number"], 7);
        assert_eq!(entry["createdIssues"][0]["id"], 9001);
    }

    #[test]
    fn reads_documents_written_with_millisecond_timestamps() {
        let document = r#"{
            "plan.md": {
                "hash": "abc",
                "lastProcessed": "2024-11-02T18:04:11.512Z",
                "createdIssues": [{ "title": "Login (Auth)", "number": 3, "id": 42 }]
            }
        }"#;

        let ledger = Ledger::from_json(document).unwrap();
        let entry = ledger.get("plan.md").unwrap();
        assert_eq!(entry.created_issues[0].title, "Login (Auth)");
        assert!(ledger.is_unchanged("plan.md", "abc"));
    }

    #[test]
    fn rejects_documents_with_wrong_shape() {
        let err = Ledger::from_json(r#"["not", "a", "map"]"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidLedger(_)));
    }
}
