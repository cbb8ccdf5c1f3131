pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_log_level, validate_non_empty_string, validate_path, validate_positive_number,
    Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DOWNLOADS_DIR: &str = "static/downloads";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "marks-recorder")]
#[command(about = "Record per-question student marks and export them as a spreadsheet")]
pub struct CliConfig {
    #[arg(short, long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Address to bind [default: 127.0.0.1]")]
    pub host: Option<String>,

    #[arg(short, long, help = "Port to listen on [default: 5000]")]
    pub port: Option<u16>,

    #[arg(long, help = "Directory for generated exports [default: static/downloads]")]
    pub downloads_dir: Option<String>,

    #[arg(long, help = "Keep only the newest N exports per format")]
    pub keep_latest: Option<usize>,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output (log level debug)")]
    pub verbose: bool,
}

/// Effective settings: TOML file values with command line flags on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub downloads_dir: String,
    pub keep_latest: Option<usize>,
    pub json_logs: bool,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            downloads_dir: DEFAULT_DOWNLOADS_DIR.to_string(),
            keep_latest: None,
            json_logs: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                file
            }
            None => TomlConfig::default(),
        };
        Ok(Self::merge(file, cli))
    }

    pub fn merge(file: TomlConfig, cli: &CliConfig) -> Self {
        let defaults = Self::default();
        // -v 優先於設定檔的 level
        let log_level = if cli.verbose {
            "debug".to_string()
        } else {
            file.log_level().unwrap_or(defaults.log_level)
        };

        Self {
            host: cli.host.clone().or(file.server.host).unwrap_or(defaults.host),
            port: cli.port.or(file.server.port).unwrap_or(defaults.port),
            downloads_dir: cli
                .downloads_dir
                .clone()
                .or(file.export.downloads_dir)
                .unwrap_or(defaults.downloads_dir),
            keep_latest: cli.keep_latest.or(file.export.keep_latest),
            json_logs: cli.json_logs || file.logging.json.unwrap_or(false),
            log_level,
        }
    }
}

impl ConfigProvider for Settings {
    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn downloads_dir(&self) -> &str {
        &self.downloads_dir
    }

    fn keep_latest(&self) -> Option<usize> {
        self.keep_latest
    }

    fn json_logs(&self) -> bool {
        self.json_logs
    }

    fn log_level(&self) -> &str {
        &self.log_level
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("host", &self.host)?;
        validate_positive_number("port", usize::from(self.port), 1)?;
        validate_path("downloads_dir", &self.downloads_dir)?;
        validate_log_level("log_level", &self.log_level)?;
        if let Some(keep) = self.keep_latest {
            validate_positive_number("keep_latest", keep, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file_or_flags() {
        let settings = Settings::resolve(&CliConfig::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.bind_address(), "127.0.0.1:5000");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_cli_flags_override_file() {
        let file = TomlConfig::from_toml_str(
            r#"
[server]
host = "0.0.0.0"
port = 8000

[export]
downloads_dir = "exports"
keep_latest = 3

[logging]
json = true
"#,
        )
        .unwrap();

        let cli = CliConfig {
            port: Some(9000),
            keep_latest: Some(1),
            ..CliConfig::default()
        };

        let settings = Settings::merge(file, &cli);
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.downloads_dir, "exports");
        assert_eq!(settings.keep_latest, Some(1));
        assert!(settings.json_logs);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_file_log_level_reaches_settings() {
        let file = TomlConfig::from_toml_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert!(file.validate().is_ok());

        let settings = Settings::merge(file, &CliConfig::default());
        assert_eq!(settings.log_level(), "warn");
        assert_ne!(settings, Settings::default());
        assert_eq!(
            crate::utils::logger::filter_directive(settings.log_level()),
            "marks_recorder=warn"
        );
    }

    #[test]
    fn test_verbose_flag_overrides_file_level() {
        let file = TomlConfig::from_toml_str("[logging]\nlevel = \"error\"\n").unwrap();
        let cli = CliConfig {
            verbose: true,
            ..CliConfig::default()
        };

        let settings = Settings::merge(file, &cli);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_cli_parsing() {
        let cli = CliConfig::parse_from([
            "marks-recorder",
            "--port",
            "7000",
            "--downloads-dir",
            "/tmp/out",
            "--keep-latest",
            "4",
            "-v",
        ]);
        assert_eq!(cli.port, Some(7000));
        assert_eq!(cli.downloads_dir.as_deref(), Some("/tmp/out"));
        assert_eq!(cli.keep_latest, Some(4));
        assert!(cli.verbose);
        assert!(!cli.json_logs);
    }

    #[test]
    fn test_zero_keep_latest_is_invalid() {
        let settings = Settings {
            keep_latest: Some(0),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = CliConfig {
            config: Some("/nonexistent/marks.toml".to_string()),
            ..CliConfig::default()
        };
        assert!(Settings::resolve(&cli).is_err());
    }
}
