//! The remote calendar collaborator.

pub mod protocol;
pub mod provider;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::SyncConfig;
use crate::error::{ApptSyncError, ApptSyncResult};
use crate::event::{NewRemoteEvent, RemoteEvent};
use crate::remote::protocol::{CreateEvent, DeleteEvent, FindEvents, ListEvents};
use crate::sync_window::SyncWindow;

pub use provider::Provider;

/// Operations the reconciler needs from a remote calendar.
#[async_trait]
pub trait RemoteCalendar: Send + Sync {
    /// Events starting within the window, ordered by start.
    async fn list_events(&self, window: &SyncWindow) -> ApptSyncResult<Vec<RemoteEvent>>;

    async fn insert_event(&self, event: &NewRemoteEvent) -> ApptSyncResult<RemoteEvent>;

    /// Free-text search over the whole calendar, not limited to any window.
    async fn find_by_text(&self, query: &str) -> ApptSyncResult<Vec<RemoteEvent>>;

    /// Deleting an event that is already gone succeeds.
    async fn delete_event(&self, event_id: &str) -> ApptSyncResult<()>;
}

/// A calendar reached through a provider binary.
#[derive(Debug, Clone)]
pub struct Remote {
    provider: Provider,
    config: Map<String, Value>,
}

impl Remote {
    pub fn new(provider: Provider, config: Map<String, Value>) -> Self {
        Remote { provider, config }
    }

    /// Build the remote for the configured provider, account and calendar.
    pub fn from_config(config: &SyncConfig) -> ApptSyncResult<Self> {
        let provider = Provider::from_name(&config.provider);

        let account = config.google_account.clone().ok_or_else(|| {
            ApptSyncError::Config(
                "No account configured. Run `apptsync auth` and set google_account".into(),
            )
        })?;

        let mut params = Map::new();
        params.insert(format!("{}_account", provider.name()), Value::String(account));
        params.insert(
            format!("{}_calendar_id", provider.name()),
            Value::String(config.calendar_id.clone()),
        );

        Ok(Remote::new(provider, params))
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }
}

#[async_trait]
impl RemoteCalendar for Remote {
    async fn list_events(&self, window: &SyncWindow) -> ApptSyncResult<Vec<RemoteEvent>> {
        let events = self
            .provider
            .call(ListEvents {
                remote_config: self.config.clone(),
                from: window.from_rfc3339(),
                to: window.to_rfc3339(),
            })
            .await?;
        debug!(count = events.len(), "Listed remote events");
        Ok(events)
    }

    async fn insert_event(&self, event: &NewRemoteEvent) -> ApptSyncResult<RemoteEvent> {
        self.provider
            .call(CreateEvent {
                remote_config: self.config.clone(),
                event: event.clone(),
            })
            .await
    }

    async fn find_by_text(&self, query: &str) -> ApptSyncResult<Vec<RemoteEvent>> {
        self.provider
            .call(FindEvents {
                remote_config: self.config.clone(),
                query: query.to_string(),
            })
            .await
    }

    async fn delete_event(&self, event_id: &str) -> ApptSyncResult<()> {
        self.provider
            .call(DeleteEvent {
                remote_config: self.config.clone(),
                event_id: event_id.to_string(),
            })
            .await
    }
}
