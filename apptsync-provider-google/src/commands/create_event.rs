use anyhow::{Context, Result};
use apptsync_core::RemoteEvent;
use apptsync_core::remote::protocol::CreateEvent;
use google_calendar::types::SendUpdates;

use super::GoogleRemoteConfig;
use crate::convert::{FromGoogle, ToGoogle};

pub async fn handle(cmd: CreateEvent) -> Result<RemoteEvent> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;

    cmd.event
        .time_zone
        .parse::<chrono_tz::Tz>()
        .map_err(|_| anyhow::anyhow!("Unknown time zone '{}'", cmd.event.time_zone))?;

    let google_event = cmd.event.to_google()?;
    let client = config.client().await?;

    let response = client
        .events()
        .insert(
            &config.google_calendar_id,
            0,
            0,
            false,
            SendUpdates::None,
            false,
            &google_event,
        )
        .await
        .with_context(|| format!("Failed to create event: {}", &google_event.summary))?;

    Ok(RemoteEvent::from_google(response.body))
}
