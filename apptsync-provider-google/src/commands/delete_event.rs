use anyhow::{Context, Result};
use apptsync_core::remote::protocol::DeleteEvent;
use google_calendar::types::SendUpdates;

use super::GoogleRemoteConfig;

pub async fn handle(cmd: DeleteEvent) -> Result<()> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let client = config.client().await?;

    let result = client
        .events()
        .delete(&config.google_calendar_id, &cmd.event_id, false, SendUpdates::None)
        .await;

    match result {
        Ok(_) => Ok(()),
        // Already deleted
        Err(e) if is_gone(&e.to_string()) => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to delete event: {}", cmd.event_id)),
    }
}

fn is_gone(error: &str) -> bool {
    error.contains("410") || error.contains("Gone")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gone_errors_are_recognised() {
        assert!(is_gone("code: 410 Gone, error: Resource has been deleted"));
        assert!(!is_gone("code: 403 Forbidden"));
    }
}
