//! Diagnostics setup
//!
//! Builds the `tracing` dispatcher the binary hands to the conversion
//! pipeline. Nothing here installs a global subscriber.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Dispatch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};

/// Verbosity level, 1 (errors only) through 6 (everything).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verbosity(u8);

impl Verbosity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn increase(self) -> Self {
        Self::new(self.0 as i64 + 1)
    }

    pub fn decrease(self) -> Self {
        Self::new(self.0 as i64 - 1)
    }

    /// err, warn, info, extra info, debug, debug2
    pub fn level_filter(self) -> LevelFilter {
        match self.0 {
            1 => LevelFilter::ERROR,
            2 => LevelFilter::WARN,
            3 => LevelFilter::INFO,
            4 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self(2)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoggerConfig {
    pub verbosity: Verbosity,
    /// Also append records to this file
    pub log_file: Option<PathBuf>,
}

/// Builds a dispatcher honoring `RUST_LOG` when set, the configured
/// verbosity otherwise.
pub fn dispatch(config: &LoggerConfig) -> std::io::Result<Dispatch> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(config.verbosity.level_filter().into()));

    let is_debug = match std::env::var("RUST_LOG") {
        Ok(directives) => directives.contains("debug") || directives.contains("trace"),
        Err(_) => config.verbosity.level_filter() >= LevelFilter::DEBUG,
    };

    let span_events = if is_debug {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(span_events.clone());

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_span_events(span_events),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(file_layer);

    Ok(Dispatch::new(subscriber))
}
