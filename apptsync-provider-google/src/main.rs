//! apptsync-provider-google - Google Calendar provider for apptsync
//!
//! This binary implements the apptsync provider protocol, reading one JSON
//! request per line on stdin and answering with one JSON line on stdout.
//!
//! The provider manages its own credentials and tokens:
//!   ~/.config/apptsync/providers/google/app_config.toml
//!   ~/.config/apptsync/providers/google/session/{account}.toml

mod app_config;
mod commands;
mod convert;
mod session;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use apptsync_core::remote::protocol::{Command, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;

        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(&format!("Failed to parse request: {}", e)),
        };

        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    Ok(())
}

async fn handle_request(request: Request) -> String {
    let params = request.params;

    match request.command {
        Command::Authenticate => match parse(params) {
            Ok(cmd) => respond(commands::authenticate::handle(cmd).await),
            Err(e) => invalid(e),
        },
        Command::ListEvents => match parse(params) {
            Ok(cmd) => respond(commands::list_events::handle(cmd).await),
            Err(e) => invalid(e),
        },
        Command::CreateEvent => match parse(params) {
            Ok(cmd) => respond(commands::create_event::handle(cmd).await),
            Err(e) => invalid(e),
        },
        Command::FindEvents => match parse(params) {
            Ok(cmd) => respond(commands::find_events::handle(cmd).await),
            Err(e) => invalid(e),
        },
        Command::DeleteEvent => match parse(params) {
            Ok(cmd) => respond(commands::delete_event::handle(cmd).await),
            Err(e) => invalid(e),
        },
    }
}

fn parse<T: DeserializeOwned>(params: serde_json::Value) -> serde_json::Result<T> {
    serde_json::from_value(params)
}

fn respond<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(data) => Response::success(data),
        Err(e) => Response::error(&format!("{:#}", e)),
    }
}

fn invalid(e: serde_json::Error) -> String {
    Response::error(&format!("Invalid params: {}", e))
}
