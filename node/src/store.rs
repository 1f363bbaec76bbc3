//! # Session State File
//!
//! Optional JSON persistence for the session snapshot (wallet, vault,
//! receipts). Writes go to a sibling temp file first and are renamed into
//! place, so a crash mid-write leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use arc_vault::SessionSnapshot;

/// Reads a snapshot. A missing file is `Ok(None)`, not an error.
pub fn load(path: &Path) -> Result<Option<SessionSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    let snapshot = serde_json::from_slice(&bytes)
        .with_context(|| format!("state file {} is not a valid snapshot", path.display()))?;
    Ok(Some(snapshot))
}

/// Writes `snapshot` to `path`, creating parent directories as needed.
pub fn save(path: &Path, snapshot: &SessionSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let json = serde_json::to_vec_pretty(snapshot).context("failed to encode snapshot")?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, json)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to move snapshot into {}", path.display()))?;

    tracing::debug!(path = %path.display(), "state file written");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_vault::vault::{units, TransactionIntent};
    use arc_vault::VaultSession;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn save_then_load_restores_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut session = VaultSession::demo();
        session.connect("0xstore", units(300)).unwrap();
        session.execute(TransactionIntent::deposit(units(250))).unwrap();

        save(&path, &session.snapshot()).unwrap();
        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded, session.snapshot());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("not a valid snapshot"));
    }
}
