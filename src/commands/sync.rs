use anyhow::{Context, Result};
use apptsync_core::config::SyncConfig;
use apptsync_core::sync::SyncMode;
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run(config: &SyncConfig, mode: SyncMode) -> Result<()> {
    let reconciler = super::reconciler(config)?.with_mode(mode);

    println!(
        "{} {}",
        "Appointments:".dimmed(),
        reconciler.appointment_file().path().display()
    );
    if mode == SyncMode::AdditionsOnly {
        println!("{}", "Additions only, nothing will be deleted".yellow());
    }

    let report = reconciler
        .run()
        .await
        .context("Sync aborted; snapshots left unchanged")?;

    println!("\n{}", report.render());

    if report.changes() == 0 && !report.has_failures() {
        println!("\n{}", "Everything up to date".green());
    }

    Ok(())
}
