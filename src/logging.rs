//! Tracing subscriber setup for the binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub log_level: String,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            with_target: false,
        }
    }
}

impl LoggingConfig {
    /// `RUST_LOG` wins over `[logging] level`.
    pub fn resolve(config: Option<&dyn ConfigPort>, rust_log: Option<String>) -> Self {
        let defaults = Self::default();
        let from_file = config.and_then(|c| c.get_string("logging", "level"));
        let with_target = config.is_some_and(|c| c.get_bool("logging", "with_target", false));
        Self {
            log_level: rust_log
                .filter(|s| !s.trim().is_empty())
                .or(from_file)
                .unwrap_or(defaults.log_level),
            with_target,
        }
    }
}

/// Install a stderr fmt subscriber. Safe to call more than once; only the
/// first call installs anything.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(&config.log_level)?;
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(config.with_target),
        )
        .try_init();

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
