use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SOURCE_BASE_URL: &str = "https://magnetic-tested-hardware.glitch.me";
pub const DEFAULT_DESTINATION_BASE_URL: &str = "https://guttural-deciduous-webserver.glitch.me";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub source: EndpointConfig,
    pub destination: EndpointConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Base address and credential of one remote directory. The credential is sent verbatim as the
/// `Authorization` header.
#[derive(Clone, Debug)]
pub struct EndpointConfig {
    pub base_url: String,
    pub api_key: SecretString,
}

#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub batch_size: u64,
    pub start_offset: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub source_base_url: Option<String>,
    pub source_api_key: Option<String>,
    pub destination_base_url: Option<String>,
    pub destination_api_key: Option<String>,
    pub batch_size: Option<u64>,
    pub start_offset: Option<u64>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: EndpointConfig {
                base_url: DEFAULT_SOURCE_BASE_URL.to_string(),
                api_key: String::new().into(),
            },
            destination: EndpointConfig {
                base_url: DEFAULT_DESTINATION_BASE_URL.to_string(),
                api_key: String::new().into(),
            },
            sync: SyncConfig { batch_size: 10, start_offset: 0 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("clientsync.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(source) = patch.source {
            source.apply(&mut self.source);
        }
        if let Some(destination) = patch.destination {
            destination.apply(&mut self.destination);
        }

        if let Some(sync) = patch.sync {
            if let Some(batch_size) = sync.batch_size {
                self.sync.batch_size = batch_size;
            }
            if let Some(start_offset) = sync.start_offset {
                self.sync.start_offset = start_offset;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CLIENTSYNC_SOURCE_BASE_URL") {
            self.source.base_url = value;
        }
        let source_key = read_env("CLIENTSYNC_SOURCE_API_KEY").or_else(|| read_env("API_KEY_1"));
        if let Some(value) = source_key {
            self.source.api_key = secret_value(value);
        }

        if let Some(value) = read_env("CLIENTSYNC_DESTINATION_BASE_URL") {
            self.destination.base_url = value;
        }
        let destination_key =
            read_env("CLIENTSYNC_DESTINATION_API_KEY").or_else(|| read_env("API_KEY_2"));
        if let Some(value) = destination_key {
            self.destination.api_key = secret_value(value);
        }

        if let Some(value) = read_env("CLIENTSYNC_SYNC_BATCH_SIZE") {
            self.sync.batch_size = parse_u64("CLIENTSYNC_SYNC_BATCH_SIZE", &value)?;
        }
        if let Some(value) = read_env("CLIENTSYNC_SYNC_START_OFFSET") {
            self.sync.start_offset = parse_u64("CLIENTSYNC_SYNC_START_OFFSET", &value)?;
        }

        let log_level =
            read_env("CLIENTSYNC_LOGGING_LEVEL").or_else(|| read_env("CLIENTSYNC_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CLIENTSYNC_LOGGING_FORMAT").or_else(|| read_env("CLIENTSYNC_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.source_base_url {
            self.source.base_url = base_url;
        }
        if let Some(api_key) = overrides.source_api_key {
            self.source.api_key = secret_value(api_key);
        }
        if let Some(base_url) = overrides.destination_base_url {
            self.destination.base_url = base_url;
        }
        if let Some(api_key) = overrides.destination_api_key {
            self.destination.api_key = secret_value(api_key);
        }
        if let Some(batch_size) = overrides.batch_size {
            self.sync.batch_size = batch_size;
        }
        if let Some(start_offset) = overrides.start_offset {
            self.sync.start_offset = start_offset;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint("source", &self.source)?;
        validate_endpoint("destination", &self.destination)?;
        validate_sync(&self.sync)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("clientsync.toml"), PathBuf::from("config/clientsync.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_endpoint(section: &str, endpoint: &EndpointConfig) -> Result<(), ConfigError> {
    let base_url = endpoint.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{section}.base_url must start with http:// or https://"
        )));
    }

    if endpoint.api_key.expose_secret().trim().is_empty() {
        let env_key = if section == "source" {
            "CLIENTSYNC_SOURCE_API_KEY or API_KEY_1"
        } else {
            "CLIENTSYNC_DESTINATION_API_KEY or API_KEY_2"
        };
        return Err(ConfigError::Validation(format!(
            "{section}.api_key is required (set it in the config file or via {env_key})"
        )));
    }

    Ok(())
}

fn validate_sync(sync: &SyncConfig) -> Result<(), ConfigError> {
    if sync.batch_size == 0 {
        return Err(ConfigError::Validation(
            "sync.batch_size must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    source: Option<EndpointPatch>,
    destination: Option<EndpointPatch>,
    sync: Option<SyncPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct EndpointPatch {
    base_url: Option<String>,
    api_key: Option<String>,
}

impl EndpointPatch {
    fn apply(self, endpoint: &mut EndpointConfig) {
        if let Some(base_url) = self.base_url {
            endpoint.base_url = base_url;
        }
        if let Some(api_key) = self.api_key {
            endpoint.api_key = secret_value(api_key);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SyncPatch {
    batch_size: Option<u64>,
    start_offset: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
