pub mod authenticate;
pub mod create_event;
pub mod delete_event;
pub mod find_events;
pub mod list_events;

use anyhow::{Context, Result};
use google_calendar::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::session::Session;

/// Google's alias for the user's main calendar
const DEFAULT_CALENDAR_ID: &str = "primary";

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

/// Provider-specific part of every request after authentication.
#[derive(Debug, Deserialize)]
pub struct GoogleRemoteConfig {
    pub google_account: String,
    #[serde(default = "default_calendar_id")]
    pub google_calendar_id: String,
}

impl TryFrom<&Map<String, Value>> for GoogleRemoteConfig {
    type Error = anyhow::Error;

    fn try_from(remote_config: &Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(remote_config.clone()))
            .context("Invalid Google remote config")
    }
}

impl GoogleRemoteConfig {
    pub async fn client(&self) -> Result<Client> {
        Session::load_valid(&self.google_account).await?.client()
    }
}
