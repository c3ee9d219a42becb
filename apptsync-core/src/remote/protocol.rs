//! JSON protocol spoken between apptsync and provider binaries over
//! stdin/stdout: one request line in, one response line out.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{NewRemoteEvent, RemoteEvent};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Authenticate,
    ListEvents,
    CreateEvent,
    FindEvents,
    DeleteEvent,
}

/// Request sent from apptsync to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider back to apptsync.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data }).unwrap_or_else(|e| {
            Response::<()>::error(&format!("Failed to serialize response: {}", e))
        })
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::json!({ "status": "error", "error": msg }).to_string()
    }
}

/// Run the provider's interactive sign-in. Answers with the account identifier.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Authenticate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_port: Option<u16>,
}

impl ProviderCommand for Authenticate {
    type Response = String;
    fn command() -> Command {
        Command::Authenticate
    }
}

/// List events starting within `[from, to]`, ordered by start.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    /// Provider-specific config (e.g., google_account, google_calendar_id)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<RemoteEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event: NewRemoteEvent,
}

impl ProviderCommand for CreateEvent {
    type Response = RemoteEvent;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Free-text search, unbounded in time.
#[derive(Debug, Serialize, Deserialize)]
pub struct FindEvents {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub query: String,
}

impl ProviderCommand for FindEvents {
    type Response = Vec<RemoteEvent>;
    fn command() -> Command {
        Command::FindEvents
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let mut remote_config = serde_json::Map::new();
        remote_config.insert("google_account".into(), "me@example.com".into());

        let params = serde_json::to_value(FindEvents {
            remote_config,
            query: "Dentist".into(),
        })
        .unwrap();
        let request = Request {
            command: FindEvents::command(),
            params,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["command"], "find_events");
        assert_eq!(json["params"]["google_account"], "me@example.com");
        assert_eq!(json["params"]["query"], "Dentist");
    }

    #[test]
    fn test_response_envelopes() {
        let ok: Response<Vec<String>> =
            serde_json::from_str(&Response::success(vec!["a".to_string()])).unwrap();
        assert!(matches!(ok, Response::Success { data } if data == vec!["a"]));

        let err: Response<()> = serde_json::from_str(&Response::error("boom")).unwrap();
        assert!(matches!(err, Response::Error { error } if error == "boom"));
    }

    #[test]
    fn test_unit_success_parses() {
        let json = Response::success(());
        let parsed: Response<()> = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, Response::Success { .. }));
    }
}
