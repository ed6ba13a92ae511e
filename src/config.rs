//! Config loading and persistence.
//!
//! One explicit struct passed into each component at construction; there is
//! no ambient/global configuration state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{AcceptanceBand, EntityId, EntryKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Entity whose contact list defines the authoritative ledger.
    pub source_owner: EntityId,
    /// Standing interval that satisfies a request.
    pub request_band: AcceptanceBand,
    /// Standing interval that satisfies a revocation.
    pub revocation_band: AcceptanceBand,
    /// Hours an actioned entry may wait for ledger confirmation before its
    /// actioned flag is reset.
    pub action_timeout_hours: u64,
    /// Hours an effective entry survives a desatisfied ledger before being
    /// reset. Absorbs transient single-cycle ledger gaps.
    pub effective_grace_hours: u64,
    /// Snapshots older than this are purged (the newest always survives).
    pub snapshot_retention_hours: u64,
    /// Effective revocations older than this are purged.
    pub revocation_retention_days: u64,
    /// When false, transitions still apply but nothing is notified.
    pub notifications_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_owner: EntityId::new(0),
            request_band: AcceptanceBand::request_default(),
            revocation_band: AcceptanceBand::revocation_default(),
            action_timeout_hours: 24,
            effective_grace_hours: 24,
            snapshot_retention_hours: 48,
            revocation_retention_days: 30,
            notifications_enabled: true,
        }
    }
}

impl Config {
    /// Acceptance band for the entry kind.
    pub fn band_for(&self, kind: EntryKind) -> AcceptanceBand {
        match kind {
            EntryKind::Request => self.request_band,
            EntryKind::Revocation => self.revocation_band,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("failed to write {path}: {reason}")]
    Write { path: String, reason: String },
}

pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load config, falling back to defaults when the file is missing or bad.
pub fn load_or_default(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match load(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("config load failed, using defaults: {e}");
            Config::default()
        }
    }
}

pub fn write_config(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    let write_err = |reason: String| ConfigError::Write {
        path: path.display().to_string(),
        reason,
    };

    let contents =
        toml::to_string_pretty(cfg).map_err(|e| write_err(format!("render failed: {e}")))?;
    let dir = path
        .parent()
        .ok_or_else(|| write_err("config path missing parent directory".to_string()))?;
    fs::create_dir_all(dir).map_err(|e| write_err(format!("create dir failed: {e}")))?;

    let temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| write_err(format!("temp file creation failed: {e}")))?;
    fs::write(temp.path(), contents.as_bytes())
        .map_err(|e| write_err(format!("write failed: {e}")))?;
    temp.persist(path)
        .map_err(|e| write_err(format!("persist failed: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_band_policy() {
        let cfg = Config::default();
        assert_eq!(cfg.band_for(EntryKind::Request), AcceptanceBand::new(0.01, 10.0));
        assert_eq!(
            cfg.band_for(EntryKind::Revocation),
            AcceptanceBand::new(-10.0, 0.0)
        );
        assert_eq!(cfg.action_timeout_hours, 24);
        assert!(cfg.notifications_enabled);
    }

    #[test]
    fn config_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.source_owner = EntityId::new(3001);
        cfg.action_timeout_hours = 12;
        cfg.notifications_enabled = false;

        write_config(&path, &cfg).expect("write config");
        let loaded = load(&path).expect("load config");
        assert_eq!(loaded.source_owner, EntityId::new(3001));
        assert_eq!(loaded.action_timeout_hours, 12);
        assert!(!loaded.notifications_enabled);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_or_default(&dir.path().join("absent.toml"));
        assert_eq!(cfg.snapshot_retention_hours, 48);
    }
}
