pub mod auth;
pub mod reset;
pub mod status;
pub mod sync;

use anyhow::Result;
use apptsync_core::config::SyncConfig;
use apptsync_core::remote::Remote;
use apptsync_core::sync::Reconciler;

/// Reconciler wired to the configured provider, appointment file and snapshots.
pub fn reconciler(config: &SyncConfig) -> Result<Reconciler<Remote>> {
    let remote = Remote::from_config(config)?;
    Ok(Reconciler::from_config(remote, config)?)
}
