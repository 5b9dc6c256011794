//! Settings come from three layers: CLI flags, then `study.ron`, then defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use ron::extensions::Extensions;
use serde::Deserialize;
use study_core::Credential;
use study_engine::{EngineSettings, DEFAULT_TABLE};

use super::cli::GlobalArgs;

pub const DEFAULT_CONFIG_FILE: &str = "study.ron";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOG_FILE: &str = "study.log";

/// Optional on-disk configuration. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub backend_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub tick_interval_ms: Option<u64>,
    pub export_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub store_url: Option<String>,
    pub store_table: Option<String>,
    /// File the values were read from; `None` when no file was found.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

pub fn parse_file_config(text: &str) -> Result<FileConfig, ron::error::SpannedError> {
    ron::Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .from_str(text)
}

/// Read `explicit`, or `study.ron` in the working directory when present.
/// A missing default file is not an error; a missing explicit one is.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
            return Ok(FileConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    };
    let mut config = parse_file_config(&text)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    config.source = Some(path);
    Ok(config)
}

#[derive(Clone)]
pub struct Settings {
    pub backend_url: String,
    pub engine: EngineSettings,
    pub export_dir: Option<PathBuf>,
    pub log_file: PathBuf,
    pub store_url: Option<String>,
    pub store_key: Option<Credential>,
    pub store_table: String,
}

impl Settings {
    pub fn resolve(cli: &GlobalArgs, file: FileConfig) -> Self {
        let defaults = EngineSettings::default();
        let poll_interval = cli
            .poll_interval_ms
            .or(file.poll_interval_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);
        let tick_interval = cli
            .tick_interval_ms
            .or(file.tick_interval_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.tick_interval);

        Self {
            backend_url: cli
                .backend_url
                .clone()
                .or(file.backend_url)
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            engine: EngineSettings {
                poll_interval,
                tick_interval,
            },
            export_dir: cli.export_dir.clone().or(file.export_dir),
            log_file: cli
                .log_file
                .clone()
                .or(file.log_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            store_url: cli.store_url.clone().or(file.store_url),
            store_key: cli.store_key.as_deref().map(Credential::new),
            store_table: file
                .store_table
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ron_fields_accept_bare_values() {
        let config = parse_file_config(
            r#"(
                backend_url: "http://analysis.local:9000",
                poll_interval_ms: 500,
                export_dir: "reports",
            )"#,
        )
        .unwrap();
        assert_eq!(
            config,
            FileConfig {
                backend_url: Some("http://analysis.local:9000".into()),
                poll_interval_ms: Some(500),
                export_dir: Some(PathBuf::from("reports")),
                ..FileConfig::default()
            }
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(parse_file_config("(backend: \"x\")").is_err());
    }

    #[test]
    fn cli_overrides_file_and_defaults_fill_gaps() {
        let cli = GlobalArgs {
            poll_interval_ms: Some(100),
            ..GlobalArgs::default()
        };
        let file = FileConfig {
            backend_url: Some("http://file:1".into()),
            poll_interval_ms: Some(900),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&cli, file);
        assert_eq!(settings.backend_url, "http://file:1");
        assert_eq!(settings.engine.poll_interval, Duration::from_millis(100));
        assert_eq!(settings.engine.tick_interval, Duration::from_millis(1000));
        assert_eq!(settings.log_file, PathBuf::from("study.log"));
        assert_eq!(settings.store_table, "q_sort_responses");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("absent.ron");
        assert!(load_file_config(Some(&explicit)).is_err());
    }

    #[test]
    fn loaded_file_records_its_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("study.ron");
        fs::write(&path, "(tick_interval_ms: 250)").unwrap();

        let config = load_file_config(Some(&path)).unwrap();
        assert_eq!(config.tick_interval_ms, Some(250));
        assert_eq!(config.source, Some(path));
    }
}
