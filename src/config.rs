use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Cli;
use crate::client::SubmitPolicy;
use crate::domain::{DEFAULT_API_BASE, DEFAULT_PAGE_SIZE, EduError};

pub const DEFAULT_CONFIG_PATH: &str = "~/.eduview/config.yml";
pub const DEFAULT_STATE_FILE: &str = "~/.eduview/state.yml";
pub const DEFAULT_LOG_FILE: &str = "~/.eduview/eduview.log";

/// Where the dashboard gets its list collections from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Built-in demo data.
    #[default]
    Mock,
    /// `GET {api_base}/subscribers` and `/messages`.
    Api,
    /// Subscribers from `subscribers_csv`, demo messages.
    Csv,
}

/// On-disk config. Every key is optional.
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub api_base: Option<String>,
    pub optimistic_offline: Option<bool>,
    pub page_size: Option<usize>,
    pub request_timeout: Option<u64>,
    pub event_poll_time: Option<u64>,
    pub state_file: Option<String>,
    pub log_file: Option<String>,
    pub export_dir: Option<String>,
    pub data_source: Option<DataSource>,
    pub subscribers_csv: Option<String>,
}

/// Effective settings after merging defaults, the config file and flags.
#[derive(Debug, Clone, PartialEq, Setters)]
pub struct Settings {
    pub api_base: String,
    pub optimistic_offline: bool,
    pub page_size: usize,
    pub request_timeout: Duration,
    pub event_poll_time: u64,
    pub state_file: PathBuf,
    pub log_file: PathBuf,
    pub export_dir: PathBuf,
    pub data_source: DataSource,
    pub subscribers_csv: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_base: DEFAULT_API_BASE.to_string(),
            optimistic_offline: true,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(10),
            event_poll_time: 100,
            state_file: expand_path(DEFAULT_STATE_FILE),
            log_file: expand_path(DEFAULT_LOG_FILE),
            export_dir: PathBuf::from("."),
            data_source: DataSource::Mock,
            subscribers_csv: None,
        }
    }
}

impl Settings {
    pub fn submit_policy(&self) -> SubmitPolicy {
        SubmitPolicy {
            optimistic_offline: self.optimistic_offline,
        }
    }

    /// Flags win over the file, the file wins over defaults.
    pub fn resolve(cli: &Cli, file: ConfigFile) -> Result<Settings, EduError> {
        let defaults = Settings::default();

        let page_size = cli.page_size.or(file.page_size).unwrap_or(defaults.page_size);
        if page_size == 0 {
            return Err(EduError::ConfigError("page_size must be at least 1".into()));
        }
        let data_source = cli.source.or(file.data_source).unwrap_or(defaults.data_source);
        let subscribers_csv = cli
            .subscribers_csv
            .as_deref()
            .or(file.subscribers_csv.as_deref())
            .map(expand_path);
        if data_source == DataSource::Csv && subscribers_csv.is_none() {
            return Err(EduError::ConfigError(
                "data_source 'csv' needs subscribers_csv".into(),
            ));
        }

        let settings = Settings {
            api_base: cli
                .api_base
                .clone()
                .or(file.api_base)
                .unwrap_or(defaults.api_base),
            optimistic_offline: cli
                .optimistic_offline
                .or(file.optimistic_offline)
                .unwrap_or(defaults.optimistic_offline),
            page_size,
            request_timeout: cli
                .timeout
                .or(file.request_timeout)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            event_poll_time: file.event_poll_time.unwrap_or(defaults.event_poll_time),
            state_file: file
                .state_file
                .as_deref()
                .map(expand_path)
                .unwrap_or(defaults.state_file),
            log_file: cli
                .log_file
                .as_deref()
                .or(file.log_file.as_deref())
                .map(expand_path)
                .unwrap_or(defaults.log_file),
            export_dir: file
                .export_dir
                .as_deref()
                .map(expand_path)
                .unwrap_or(defaults.export_dir),
            data_source,
            subscribers_csv,
        };
        debug!("Resolved settings: {settings:?}");
        Ok(settings)
    }
}

pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(raw),
    }
}

pub fn default_config_path() -> PathBuf {
    expand_path(DEFAULT_CONFIG_PATH)
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, EduError> {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(ConfigFile::default()),
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents).map_err(|e| {
            EduError::ConfigError(format!("failed to parse config '{}': {e}", path.display()))
        }),
        Err(e) if e.kind() == ErrorKind::NotFound && allow_missing => Ok(ConfigFile::default()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(EduError::ConfigError(format!(
            "config file not found '{}'",
            path.display()
        ))),
        Err(e) => Err(EduError::IoError(e)),
    }
}

/// Loads the file named by `--config`, or the default one if it exists,
/// and merges it with the flags.
pub fn settings_from_cli(cli: &Cli) -> Result<Settings, EduError> {
    let file = match &cli.config {
        Some(path) => load_config(&expand_path(path), false)?,
        None => load_config(&default_config_path(), true)?,
    };
    Settings::resolve(cli, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("eduview").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let settings = Settings::resolve(&cli(&[]), ConfigFile::default()).unwrap();
        assert_eq!(settings.api_base, "http://localhost:8000/api");
        assert!(settings.optimistic_offline);
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert_eq!(settings.data_source, DataSource::Mock);
        assert!(settings.state_file.ends_with(".eduview/state.yml"));
    }

    #[test]
    fn flags_override_file_values() {
        let file: ConfigFile = serde_yaml::from_str(
            "api_base: http://edu.test/api\npage_size: 25\noptimistic_offline: true\ndata_source: api\n",
        )
        .unwrap();
        let settings = Settings::resolve(
            &cli(&["--page-size", "5", "--optimistic-offline", "false"]),
            file,
        )
        .unwrap();
        assert_eq!(settings.api_base, "http://edu.test/api");
        assert_eq!(settings.page_size, 5);
        assert!(!settings.optimistic_offline);
        assert!(!settings.submit_policy().optimistic_offline);
        assert_eq!(settings.data_source, DataSource::Api);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let file = ConfigFile {
            page_size: Some(0),
            ..ConfigFile::default()
        };
        assert!(matches!(
            Settings::resolve(&cli(&[]), file),
            Err(EduError::ConfigError(_))
        ));
        assert!(matches!(
            Settings::resolve(&cli(&["--source", "csv"]), ConfigFile::default()),
            Err(EduError::ConfigError(_))
        ));
    }

    #[test]
    fn missing_file_only_fails_when_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        assert!(load_config(&path, true).is_ok());
        assert!(matches!(load_config(&path, false), Err(EduError::ConfigError(_))));

        std::fs::write(&path, "page_size: [oops").unwrap();
        assert!(load_config(&path, true).is_err());
        std::fs::write(&path, "export_dir: /tmp/exports\n").unwrap();
        assert_eq!(
            load_config(&path, false).unwrap().export_dir.as_deref(),
            Some("/tmp/exports")
        );
    }
}
