use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::domain::EduError;

pub const LOG_ENV: &str = "EDUVIEW_LOG";

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level(verbose)))
}

/// The dashboard owns the terminal, so its logs go to a file.
pub fn init_file_logging(path: &Path, verbose: u8) -> Result<(), EduError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);
    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(layer)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| EduError::ConfigError(format!("logging already initialized: {e}")))
}

pub fn init_stderr_logging(verbose: u8) -> Result<(), EduError> {
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(layer)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| EduError::ConfigError(format!("logging already initialized: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_level(0), "info");
        assert_eq!(default_level(1), "debug");
        assert_eq!(default_level(5), "trace");
    }
}
