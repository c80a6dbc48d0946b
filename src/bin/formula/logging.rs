//! Tracing subscriber setup

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use formula::config::LoggingConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// Where log lines go when no file is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Stderr,
    /// The terminal UI owns the screen
    Discard,
}

fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
pub fn init(config: &LoggingConfig, fallback: Fallback) -> io::Result<()> {
    let filter = filter(config);
    match (&config.file, fallback) {
        (Some(path), _) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        (None, Fallback::Stderr) => {
            fmt().with_env_filter(filter).with_writer(io::stderr).init();
        }
        (None, Fallback::Discard) => {}
    }
    Ok(())
}
