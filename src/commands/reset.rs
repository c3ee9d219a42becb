use anyhow::Result;
use apptsync_core::config::SyncConfig;

pub fn run(config: &SyncConfig) -> Result<()> {
    let store = config.snapshot_store()?;
    store.reset()?;

    println!("Snapshots cleared ({})", store.dir().display());
    println!("The next sync treats everything on both sides as new.");

    Ok(())
}
