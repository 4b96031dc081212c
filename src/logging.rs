//! Logging setup for the CLI.
//!
//! Events go to stderr so that `--json` output on stdout stays parseable.
//! `RUST_LOG` overrides the level picked from the flags.

use std::io;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            show_target: false,
        }
    }
}

impl LoggingConfig {
    pub fn from_args(quiet: bool, verbose: bool) -> Self {
        let level = if verbose {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            Level::WARN
        };
        Self {
            level,
            show_target: verbose,
        }
    }
}

pub fn init_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sprintdesk={}", config.level)));

    let fmt_layer = fmt::layer()
        .with_target(config.show_target)
        .with_level(true)
        .with_ansi(false)
        .with_writer(io::stderr);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}
