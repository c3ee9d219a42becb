use anyhow::{Context, Result};
use apptsync_core::RemoteEvent;
use apptsync_core::remote::protocol::FindEvents;
use google_calendar::types::OrderBy;

use super::GoogleRemoteConfig;
use crate::convert::FromGoogle;

const MAX_RESULTS: usize = 10;

pub async fn handle(cmd: FindEvents) -> Result<Vec<RemoteEvent>> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let client = config.client().await?;

    let response = client
        .events()
        .list_all(
            &config.google_calendar_id,
            "",
            0,
            OrderBy::default(),
            &[],
            &cmd.query,
            &[],
            false,
            false,
            false,
            "",
            "",
            "",
            "",
        )
        .await
        .with_context(|| format!("Failed to search events for '{}'", cmd.query))?;

    Ok(response
        .body
        .into_iter()
        .take(MAX_RESULTS)
        .map(RemoteEvent::from_google)
        .collect())
}
