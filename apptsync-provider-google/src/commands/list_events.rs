use anyhow::{Context, Result};
use apptsync_core::RemoteEvent;
use apptsync_core::remote::protocol::ListEvents;
use google_calendar::types::OrderBy;

use super::GoogleRemoteConfig;
use crate::convert::FromGoogle;

/// Fixed page size; later pages are not fetched.
const MAX_EVENTS: usize = 250;

pub async fn handle(cmd: ListEvents) -> Result<Vec<RemoteEvent>> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let client = config.client().await?;

    let response = client
        .events()
        .list_all(
            &config.google_calendar_id,
            "",
            0,
            OrderBy::StartTime,
            &[],
            "", // search query
            &[],
            false,
            false,
            true, // expand recurring events into single occurrences
            &cmd.to,
            &cmd.from,
            "",
            "",
        )
        .await
        .context("Failed to fetch events")?;

    Ok(response
        .body
        .into_iter()
        .take(MAX_EVENTS)
        .map(RemoteEvent::from_google)
        .collect())
}
