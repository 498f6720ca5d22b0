//! Structured logging setup
//!
//! One global `tracing` subscriber per process, always writing to stderr so the
//! terminal commands keep stdout for roast text. `RUST_LOG`, when set, replaces
//! the configured directives entirely.

use crate::config::ObservabilityConfig;
use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Where log output will be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Long-running HTTP service: full timestamps and HTTP layer spans
    Server,
    /// `roast` / `chat` in a terminal: compact lines interleaved with output
    Terminal,
}

/// Filter directives used when `RUST_LOG` is not set
pub fn default_directives(log_level: &str, target: LogTarget) -> String {
    match target {
        LogTarget::Server => format!("roastmaster={},tower_http=debug", log_level),
        LogTarget::Terminal => format!("roastmaster={}", log_level),
    }
}

/// Install the global subscriber
///
/// Only the first call in a process has any effect.
///
/// # Examples
///
/// ```no_run
/// use roastmaster::config::ObservabilityConfig;
/// use roastmaster::telemetry::{self, LogTarget};
///
/// telemetry::init(&ObservabilityConfig::default(), LogTarget::Server);
/// tracing::info!("Application started");
/// ```
pub fn init(config: &ObservabilityConfig, target: LogTarget) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level, target)));

        let registry = tracing_subscriber::registry().with(filter);
        match target {
            LogTarget::Server => registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init(),
            LogTarget::Terminal => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .without_time()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_directives_include_http_layer() {
        assert_eq!(
            default_directives("info", LogTarget::Server),
            "roastmaster=info,tower_http=debug"
        );
    }

    #[test]
    fn test_terminal_directives_scope_to_crate() {
        let directives = default_directives("warn", LogTarget::Terminal);
        assert_eq!(directives, "roastmaster=warn");
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
