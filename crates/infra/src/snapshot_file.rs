//! Loading a ledger snapshot from a JSON file.

use std::path::{Path, PathBuf};

use thiserror::Error;

use splitledger_approvals::LedgerSnapshot;

#[derive(Debug, Error)]
pub enum SnapshotFileError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON, or a value of the wrong type (e.g. fractional cents).
    #[error("failed to decode snapshot {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn load_snapshot(path: &Path) -> Result<LedgerSnapshot, SnapshotFileError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SnapshotFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = parse_snapshot(&raw).map_err(|source| SnapshotFileError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        expenses = snapshot.expenses.len(),
        payments = snapshot.payments.len(),
        approvals = snapshot.approvals.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

pub fn parse_snapshot(raw: &str) -> Result<LedgerSnapshot, serde_json::Error> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_cents_fail_to_decode() {
        let raw = r#"{
            "expenses": [{
                "id": "e1", "title": "Taxi", "amountCents": 10.5, "paidById": "a",
                "isSettled": false, "createdAt": "2024-01-01T00:00:00Z"
            }]
        }"#;
        let err = parse_snapshot(raw).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let snapshot = parse_snapshot(r#"{"userIds": ["a"]}"#).unwrap();
        assert_eq!(snapshot.user_ids.len(), 1);
        assert!(snapshot.expenses.is_empty());
        assert!(snapshot.approvals.is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_snapshot(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, SnapshotFileError::Io { .. }));
    }
}
