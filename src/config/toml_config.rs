use crate::utils::error::{MarksError, Result};
use crate::utils::validation::{
    validate_log_level, validate_non_empty_string, validate_path, validate_positive_number,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub downloads_dir: Option<String>,
    /// Keep only this many exports per format. Unset keeps everything.
    pub keep_latest: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: Option<bool>,
    pub level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MarksError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MarksError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MARKS_PORT})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Configured log level, lowercased.
    pub fn log_level(&self) -> Option<String> {
        self.logging.level.as_ref().map(|level| level.to_ascii_lowercase())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(host) = &self.server.host {
            validate_non_empty_string("server.host", host)?;
        }
        if let Some(port) = self.server.port {
            validate_positive_number("server.port", usize::from(port), 1)?;
        }
        if let Some(dir) = &self.export.downloads_dir {
            validate_path("export.downloads_dir", dir)?;
        }
        if let Some(keep) = self.export.keep_latest {
            validate_positive_number("export.keep_latest", keep, 1)?;
        }
        if let Some(level) = &self.logging.level {
            validate_log_level("logging.level", level)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
host = "0.0.0.0"
port = 8080

[export]
downloads_dir = "/var/lib/marks"
keep_latest = 5

[logging]
json = true
level = "debug"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.server.port, Some(8080));
        assert_eq!(config.export.downloads_dir.as_deref(), Some("/var/lib/marks"));
        assert_eq!(config.export.keep_latest, Some(5));
        assert_eq!(config.logging.json, Some(true));
        assert_eq!(config.log_level().as_deref(), Some("debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sections_are_optional() {
        let config = TomlConfig::from_toml_str("[export]\nkeep_latest = 2\n").unwrap();
        assert!(config.server.host.is_none());
        assert_eq!(config.export.keep_latest, Some(2));
        assert!(config.log_level().is_none());

        let empty = TomlConfig::from_toml_str("").unwrap();
        assert!(empty.export.downloads_dir.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MARKS_TEST_DOWNLOADS", "/tmp/marks-downloads");

        let toml_content = r#"
[export]
downloads_dir = "${MARKS_TEST_DOWNLOADS}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.export.downloads_dir.as_deref(),
            Some("/tmp/marks-downloads")
        );

        std::env::remove_var("MARKS_TEST_DOWNLOADS");
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str("[export]\nkeep_latest = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str("[server]\nport = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_is_normalised() {
        let config = TomlConfig::from_toml_str("[logging]\nlevel = \"WARN\"\n").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level().as_deref(), Some("warn"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, MarksError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 5050\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.port, Some(5050));
    }
}
