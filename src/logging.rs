//! Logging configuration using tracing.
//!
//! Log lines go to stderr so stdout stays free for command output.
//! `RUST_LOG` overrides the default filter entirely.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset: our crates at `level`, everything else at warn.
fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("warn,apptsync={level},apptsync_core={level}")
}

pub fn init(verbose: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .without_time(),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(false), "warn,apptsync=info,apptsync_core=info");
        assert_eq!(default_filter(true), "warn,apptsync=debug,apptsync_core=debug");
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
    }
}
