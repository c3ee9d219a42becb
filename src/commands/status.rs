use anyhow::Result;
use apptsync_core::config::SyncConfig;
use owo_colors::OwoColorize;

use crate::render::{Render, create_spinner};

pub async fn run(config: &SyncConfig) -> Result<()> {
    let reconciler = super::reconciler(config)?;

    let spinner = create_spinner("Comparing with last sync".into());
    let result = reconciler.plan().await;
    spinner.finish_and_clear();

    let plan = result?;

    println!(
        "{} {}",
        "Appointments:".dimmed(),
        reconciler.appointment_file().path().display()
    );
    println!("{}", plan.render());

    Ok(())
}
