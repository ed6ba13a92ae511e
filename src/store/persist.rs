//! State file persistence.
//!
//! The snapshot sequence and the entry table (with its log) are the only
//! state this core owns; they serialize together into one JSON file,
//! written atomically so a crash never leaves a half-written state behind.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entries::EntryStore;
use super::snapshots::SnapshotStore;

/// Everything the core persists.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StandingsState {
    pub snapshots: SnapshotStore,
    pub entries: EntryStore,
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to read state file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse state file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to write state file {path}: {reason}")]
    Write { path: String, reason: String },
}

/// Load state from a JSON file.
pub fn load(path: &Path) -> Result<StandingsState, PersistError> {
    let contents = fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| PersistError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load state, falling back to empty state when the file does not exist.
pub fn load_or_default(path: &Path) -> StandingsState {
    if !path.exists() {
        return StandingsState::default();
    }
    match load(path) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!("state load failed, starting empty: {e}");
            StandingsState::default()
        }
    }
}

/// Write state to a JSON file atomically (temp file + rename).
pub fn save(path: &Path, state: &StandingsState) -> Result<(), PersistError> {
    let write_err = |reason: String| PersistError::Write {
        path: path.display().to_string(),
        reason,
    };

    let contents =
        serde_json::to_vec_pretty(state).map_err(|e| write_err(format!("render failed: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| write_err("state path missing parent directory".to_string()))?;
    fs::create_dir_all(dir).map_err(|e| write_err(format!("create dir failed: {e}")))?;

    let temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| write_err(format!("temp file creation failed: {e}")))?;
    fs::write(temp.path(), &contents).map_err(|e| write_err(format!("write failed: {e}")))?;
    temp.persist(path)
        .map_err(|e| write_err(format!("persist failed: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityId, EntityKind, UserId, WallClock};

    #[test]
    fn state_roundtrips_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("standings.json");

        let mut state = StandingsState::default();
        let entry = state.entries.add_request(
            UserId::new(1),
            EntityId::new(1010),
            EntityKind::Character,
            WallClock(1_000),
        );
        state.snapshots.create(vec![], WallClock(2_000));

        save(&path, &state).expect("save state");
        let loaded = load(&path).expect("load state");

        assert_eq!(loaded.entries.len(), 1);
        assert!(loaded.entries.get(entry).is_some());
        assert_eq!(loaded.snapshots.len(), 1);
        assert_eq!(loaded.entries.log().len(), 1);

        // Id assignment continues past loaded entries instead of reusing ids.
        let mut loaded = loaded;
        let next = loaded.entries.add_request(
            UserId::new(2),
            EntityId::new(2020),
            EntityKind::Character,
            WallClock(3_000),
        );
        assert!(next > entry);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = load_or_default(&dir.path().join("absent.json"));
        assert!(state.entries.is_empty());
        assert!(state.snapshots.is_empty());
    }
}
