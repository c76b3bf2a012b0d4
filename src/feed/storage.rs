use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Notification;

const SNAPSHOT_VERSION: u32 = 1;

/// What the feed writes to disk between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedSnapshot {
    #[serde(default)]
    pub version: u32,
    /// Survives restarts so a cleared feed stays empty even when the backend
    /// cannot confirm the clear.
    #[serde(default)]
    pub cleared: bool,
    #[serde(default)]
    pub items: Vec<Notification>,
}

impl FeedSnapshot {
    pub fn current(cleared: bool, items: Vec<Notification>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            cleared,
            items,
        }
    }
}

/// Where and how the feed snapshot is persisted.
#[derive(Debug, Clone)]
pub struct FeedStorage {
    path: PathBuf,
}

impl FeedStorage {
    /// Snapshot file in the platform data directory.
    pub fn default_location() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "estate-desk")
            .context("Could not determine a data directory for this platform")?;
        let dir = dirs.data_dir();
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self {
            path: dir.join("notifications.json"),
        })
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot. A missing file is a fresh start; an unreadable one
    /// is logged and treated the same way rather than taking the feed down.
    pub fn load(&self) -> Result<FeedSnapshot> {
        if !self.path.exists() {
            return Ok(FeedSnapshot {
                version: SNAPSHOT_VERSION,
                ..FeedSnapshot::default()
            });
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Feed cache unreadable; starting fresh");
                Ok(FeedSnapshot {
                    version: SNAPSHOT_VERSION,
                    ..FeedSnapshot::default()
                })
            }
        }
    }

    /// Write the snapshot via a temp file so a crash mid-write never leaves a
    /// half-written cache behind.
    pub fn save(&self, snapshot: &FeedSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;

    #[test]
    fn missing_file_loads_as_fresh_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FeedStorage::at_path(dir.path().join("notifications.json"));

        let snapshot = storage.load().unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert!(snapshot.items.is_empty());
        assert!(!snapshot.cleared);
    }

    #[test]
    fn snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FeedStorage::at_path(dir.path().join("notifications.json"));

        let snapshot = FeedSnapshot {
            version: SNAPSHOT_VERSION,
            cleared: true,
            items: vec![Notification::local(
                NotificationKind::System,
                "saved offline",
                None,
                None,
            )],
        };
        storage.save(&snapshot).unwrap();

        let loaded = storage.load().unwrap();
        assert!(loaded.cleared);
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].message, "saved offline");
    }

    #[test]
    fn corrupt_file_loads_as_fresh_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifications.json");
        fs::write(&path, "{not json").unwrap();

        let snapshot = FeedStorage::at_path(&path).load().unwrap();
        assert!(snapshot.items.is_empty());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/cache/notifications.json");

        let storage = FeedStorage::at_path(&path);
        storage.save(&FeedSnapshot::default()).unwrap();
        assert!(path.exists());
    }
}
