//! User configuration at ~/.config/apptsync/config.toml
//!
//! Every key can be overridden with an `APPTSYNC_` environment variable,
//! e.g. `APPTSYNC_PAST_DAYS=14`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::appointments::AppointmentFile;
use crate::error::{ApptSyncError, ApptSyncResult};
use crate::snapshot::SnapshotStore;
use crate::sync_window::SyncWindow;

const DEFAULT_PAST_DAYS: u32 = 7;
const DEFAULT_FUTURE_DAYS: u32 = 30;
const DEFAULT_CALENDAR_ID: &str = "primary";
const DEFAULT_TIME_ZONE: &str = "Europe/Paris";
const DEFAULT_PROVIDER: &str = "google";

fn default_past_days() -> u32 {
    DEFAULT_PAST_DAYS
}

fn default_future_days() -> u32 {
    DEFAULT_FUTURE_DAYS
}

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Days before now included in the sync window.
    #[serde(default = "default_past_days")]
    pub past_days: u32,

    /// Days after now included in the sync window.
    #[serde(default = "default_future_days")]
    pub future_days: u32,

    /// Candidate appointment files; the first that exists is used.
    #[serde(default)]
    pub appointments_paths: Vec<PathBuf>,

    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// Account the provider authenticated, as printed by `apptsync auth`.
    pub google_account: Option<String>,

    /// IANA zone attached to events inserted remotely.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    pub snapshot_dir: Option<PathBuf>,

    #[serde(default = "default_provider")]
    pub provider: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            past_days: DEFAULT_PAST_DAYS,
            future_days: DEFAULT_FUTURE_DAYS,
            appointments_paths: Vec::new(),
            calendar_id: default_calendar_id(),
            google_account: None,
            time_zone: default_time_zone(),
            snapshot_dir: None,
            provider: default_provider(),
        }
    }
}

impl SyncConfig {
    pub fn config_path() -> ApptSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ApptSyncError::Config("Could not determine config directory".into()))?
            .join("apptsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path` (or the default location), layered with the environment.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> ApptSyncResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        let config: SyncConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("APPTSYNC")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("appointments_paths"),
            )
            .build()
            .map_err(|e| ApptSyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ApptSyncError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ApptSyncResult<()> {
        self.time_zone.parse::<chrono_tz::Tz>().map_err(|_| {
            ApptSyncError::Config(format!("Unknown time zone '{}'", self.time_zone))
        })?;

        if self.calendar_id.trim().is_empty() {
            return Err(ApptSyncError::Config("calendar_id must not be empty".into()));
        }
        if self.provider.trim().is_empty() {
            return Err(ApptSyncError::Config("provider must not be empty".into()));
        }
        Ok(())
    }

    pub fn window_at(&self, now: DateTime<Utc>) -> SyncWindow {
        SyncWindow::around(now, self.past_days, self.future_days)
    }

    pub fn appointment_file(&self) -> AppointmentFile {
        let candidates: Vec<PathBuf> = self.appointments_paths.iter().map(|p| expand(p)).collect();
        AppointmentFile::resolve(&candidates)
    }

    pub fn snapshot_dir(&self) -> ApptSyncResult<PathBuf> {
        match &self.snapshot_dir {
            Some(dir) => Ok(expand(dir)),
            None => Ok(dirs::data_dir()
                .ok_or_else(|| ApptSyncError::Config("Could not determine data directory".into()))?
                .join("apptsync")
                .join("snapshots")),
        }
    }

    pub fn snapshot_store(&self) -> ApptSyncResult<SnapshotStore> {
        Ok(SnapshotStore::new(self.snapshot_dir()?))
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
