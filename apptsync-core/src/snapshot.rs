//! Per-side snapshots of what each calendar looked like after the last run.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ApptSyncError, ApptSyncResult};
use crate::event::{Appointment, RemoteEvent};

const REMOTE_SNAPSHOT_FILE: &str = "remote_events.json";
const LOCAL_SNAPSHOT_FILE: &str = "local_events.json";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshots {
    pub remote: Vec<RemoteEvent>,
    pub local: Vec<Appointment>,
}

pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load both snapshots. A missing or unreadable snapshot loads as empty.
    pub fn load(&self) -> Snapshots {
        Snapshots {
            remote: self.read(REMOTE_SNAPSHOT_FILE),
            local: self.read(LOCAL_SNAPSHOT_FILE),
        }
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Vec<T> {
        let path = self.dir.join(name);
        if !path.exists() {
            return vec![];
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read snapshot, treating as empty");
                return vec![];
            }
        };

        match serde_json::from_str(&content) {
            Ok(events) => events,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt snapshot, treating as empty");
                vec![]
            }
        }
    }

    /// Replace both snapshots.
    ///
    /// Both files are fully written to temp files before either is renamed
    /// into place.
    pub fn save(&self, remote: &[RemoteEvent], local: &[Appointment]) -> ApptSyncResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let remote_temp = self.write_temp(REMOTE_SNAPSHOT_FILE, remote)?;
        let local_temp = self.write_temp(LOCAL_SNAPSHOT_FILE, local)?;

        std::fs::rename(&remote_temp, self.dir.join(REMOTE_SNAPSHOT_FILE))?;
        std::fs::rename(&local_temp, self.dir.join(LOCAL_SNAPSHOT_FILE))?;

        debug!(
            dir = %self.dir.display(),
            remote = remote.len(),
            local = local.len(),
            "Saved snapshots"
        );
        Ok(())
    }

    fn write_temp<T: Serialize>(&self, name: &str, events: &[T]) -> ApptSyncResult<PathBuf> {
        let json = serde_json::to_string_pretty(events)
            .map_err(|e| ApptSyncError::Serialization(e.to_string()))?;
        let temp = self.dir.join(name.to_string() + ".tmp");
        std::fs::write(&temp, json)?;
        Ok(temp)
    }

    /// Delete both snapshots, and the directory if that leaves it empty.
    /// Does nothing when there is nothing to delete.
    pub fn reset(&self) -> ApptSyncResult<()> {
        for name in [REMOTE_SNAPSHOT_FILE, LOCAL_SNAPSHOT_FILE] {
            let path = self.dir.join(name);
            if path.exists() {
                std::fs::remove_file(&path)?;
                debug!(path = %path.display(), "Removed snapshot");
            }
        }

        if self.dir.is_dir() && std::fs::read_dir(&self.dir)?.next().is_none() {
            std::fs::remove_dir(&self.dir)?;
        }
        Ok(())
    }
}
