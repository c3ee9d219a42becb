//! Provider subprocess calls.
//!
//! A provider is any executable named `apptsync-provider-<name>` on `PATH`
//! that speaks the JSON protocol in [`super::protocol`]. Providers own their
//! credentials; apptsync only passes the account and calendar to use.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{ApptSyncError, ApptSyncResult};
use crate::remote::protocol::{Authenticate, Command, ProviderCommand, Request, Response};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);
/// Sign-in waits on the user in a browser.
const AUTH_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    fn binary_name(&self) -> String {
        format!("apptsync-provider-{}", self.0)
    }

    fn binary_path(&self) -> ApptSyncResult<PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| {
            ApptSyncError::ProviderNotInstalled(format!(
                "Provider '{}' not found. Install it with:\n  cargo install {}",
                self.0, binary_name
            ))
        })
    }

    /// Run the provider's sign-in flow and return the account identifier.
    pub async fn authenticate(&self, redirect_port: Option<u16>) -> ApptSyncResult<String> {
        timeout(
            AUTH_TIMEOUT,
            self.call_raw(Authenticate::command(), Authenticate { redirect_port }),
        )
        .await
        .map_err(|_| ApptSyncError::ProviderTimeout(AUTH_TIMEOUT.as_secs()))?
    }

    /// Call a typed provider command and return its typed response.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> ApptSyncResult<C::Response> {
        timeout(PROVIDER_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| ApptSyncError::ProviderTimeout(PROVIDER_TIMEOUT.as_secs()))?
    }

    async fn call_raw<P: Serialize, R: DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> ApptSyncResult<R> {
        let params =
            serde_json::to_value(params).map_err(|e| ApptSyncError::Serialization(e.to_string()))?;
        let request_json = serde_json::to_string(&Request { command, params })
            .map_err(|e| ApptSyncError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!(provider = %self.0, ?command, "Calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ApptSyncError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ApptSyncError::Provider("Provider stdin unavailable".into()))?;
        stdin.write_all(format!("{request_json}\n").as_bytes()).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(ApptSyncError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        parse_response(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_response<R: DeserializeOwned>(stdout: &str) -> ApptSyncResult<R> {
    if stdout.trim().is_empty() {
        return Err(ApptSyncError::Provider("Provider returned no response".into()));
    }

    let response: Response<R> = serde_json::from_str(stdout)
        .map_err(|e| ApptSyncError::Provider(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error { error } => Err(ApptSyncError::Provider(error)),
    }
}
