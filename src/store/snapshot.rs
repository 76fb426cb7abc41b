use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::CatalogRecord;

/// On-disk form of the in-memory catalog.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub next_id: u64,
    pub records: Vec<CatalogRecord>,
}

/// Load a snapshot. Returns `Ok(None)` if the file does not exist yet.
pub fn load_snapshot(path: &Path) -> Result<Option<CatalogSnapshot>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    let snapshot = serde_json::from_str(&text)?;
    Ok(Some(snapshot))
}

/// Write the snapshot to a sibling temp file, then rename it over `path`.
pub fn save_snapshot(path: &Path, snapshot: &CatalogSnapshot) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), records = snapshot.records.len(), "Saved catalog snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_snapshot(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let snapshot = CatalogSnapshot { next_id: 42, records: vec![] };
        save_snapshot(&path, &snapshot).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), Some(snapshot));
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_snapshot(&path), Err(StoreError::Serde(_))));
    }
}
