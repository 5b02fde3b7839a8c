//! Configuration loading with precedence handling.
//!
//! Precedence (lowest to highest): defaults, config file, environment, CLI.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const APP_DIR: &str = "flashcards-study";
pub const CONFIG_ENV: &str = "FLASHCARDS_CONFIG";
pub const SERVER_ENV: &str = "FLASHCARDS_SERVER";
pub const SESSION_ENV: &str = "FLASHCARDS_SESSION";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Invalid TOML in {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },
}

/// `config.toml` contents. Every field is optional.
///
/// ```toml
/// server_url = "https://cards.example.com"
/// session_cookie = "session=..."
/// request_timeout_secs = 30
/// math = true
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub server_url: Option<String>,

    /// Cookie header value identifying the signed-in user.
    #[serde(default)]
    pub session_cookie: Option<String>,

    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Render TeX in card text.
    #[serde(default)]
    pub math: Option<bool>,

    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub server_url: String,
    pub session_cookie: Option<String>,
    pub request_timeout: Duration,
    pub math: bool,
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            session_cookie: None,
            request_timeout: Duration::from_secs(30),
            math: true,
            log_file_path: default_log_path(),
        }
    }
}

/// Command-line overrides; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub server_url: Option<String>,
    pub session_cookie: Option<String>,
    pub no_math: bool,
}

/// `~/.local/state/flashcards-study/study.log`, or the working directory as a fallback.
pub fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join(APP_DIR).join("study.log"))
        .unwrap_or_else(|| PathBuf::from("study.log"))
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Missing file is not an error.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// `--config` wins over `FLASHCARDS_CONFIG`, which wins over the default path.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(path) => load_config_file(path),
        None => Ok(None),
    }
}

pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        server_url: config.server_url.unwrap_or(defaults.server_url),
        session_cookie: config.session_cookie.or(defaults.session_cookie),
        request_timeout: config
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout),
        math: config.math.unwrap_or(defaults.math),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

pub fn apply_env_overrides(config: ResolvedConfig) -> ResolvedConfig {
    apply_env_from(config, |key| std::env::var(key).ok())
}

/// Same as [`apply_env_overrides`] with an explicit variable lookup.
pub fn apply_env_from(
    mut config: ResolvedConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    if let Some(server) = lookup(SERVER_ENV).filter(|s| !s.is_empty()) {
        config.server_url = server;
    }
    if let Some(cookie) = lookup(SESSION_ENV).filter(|s| !s.is_empty()) {
        config.session_cookie = Some(cookie);
    }
    config
}

pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(server) = cli.server_url {
        config.server_url = server;
    }
    if let Some(cookie) = cli.session_cookie {
        config.session_cookie = Some(cookie);
    }
    if cli.no_math {
        config.math = false;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = ResolvedConfig::default();
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.math);
        assert!(config.log_file_path.ends_with("study.log"));
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let result = load_config_file("/nonexistent/flashcards-study/config.toml");
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_load_and_merge_file() {
        let dir = std::env::temp_dir().join("flashcards_study_config_merge");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(
            &path,
            "server_url = \"https://cards.example.com\"\nrequest_timeout_secs = 5\nmath = false\n",
        )
        .unwrap();

        let config = merge_config(load_config_file(&path).unwrap());

        assert_eq!(config.server_url, "https://cards.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(!config.math);
        assert_eq!(config.session_cookie, None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_toml_and_unknown_fields() {
        let dir = std::env::temp_dir().join("flashcards_study_config_invalid");
        fs::create_dir_all(&dir).unwrap();

        let broken = dir.join("broken.toml");
        fs::write(&broken, "server_url = ").unwrap();
        assert!(matches!(
            load_config_file(&broken),
            Err(ConfigError::ParseError { .. })
        ));

        let unknown = dir.join("unknown.toml");
        fs::write(&unknown, "theme = \"dark\"\n").unwrap();
        assert!(matches!(
            load_config_file(&unknown),
            Err(ConfigError::ParseError { .. })
        ));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile {
            server_url: Some("http://file".to_string()),
            session_cookie: Some("session=file".to_string()),
            ..ConfigFile::default()
        };

        let config = apply_env_from(merge_config(Some(file)), |key| match key {
            SERVER_ENV => Some("http://env".to_string()),
            SESSION_ENV => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.server_url, "http://env");
        assert_eq!(config.session_cookie.as_deref(), Some("session=file"));
    }

    #[test]
    fn test_cli_overrides_everything() {
        let config = apply_env_from(ResolvedConfig::default(), |key| match key {
            SERVER_ENV => Some("http://env".to_string()),
            _ => None,
        });

        let config = apply_cli_overrides(
            config,
            CliOverrides {
                server_url: Some("http://cli".to_string()),
                session_cookie: Some("session=cli".to_string()),
                no_math: true,
            },
        );

        assert_eq!(config.server_url, "http://cli");
        assert_eq!(config.session_cookie.as_deref(), Some("session=cli"));
        assert!(!config.math);
    }

    #[test]
    fn test_empty_cli_keeps_config() {
        let config = apply_cli_overrides(ResolvedConfig::default(), CliOverrides::default());
        assert_eq!(config, ResolvedConfig::default());
    }
}
