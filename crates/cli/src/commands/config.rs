use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clientsync_core::config::{AppConfig, EndpointConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run(config_path: Option<PathBuf>) -> String {
    let config = match AppConfig::load(LoadOptions {
        require_file: config_path.is_some(),
        config_path: config_path.clone(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(config_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source_of = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    for (section, endpoint, env_prefix, legacy_key) in [
        ("source", &config.source, "CLIENTSYNC_SOURCE", "API_KEY_1"),
        ("destination", &config.destination, "CLIENTSYNC_DESTINATION", "API_KEY_2"),
    ] {
        let base_url_key = format!("{section}.base_url");
        let base_url_env = format!("{env_prefix}_BASE_URL");
        lines.push(render_line(
            &base_url_key,
            &endpoint.base_url,
            source_of(&base_url_key, &[base_url_env.as_str()]),
        ));

        let api_key_key = format!("{section}.api_key");
        let api_key_env = format!("{env_prefix}_API_KEY");
        lines.push(render_line(
            &api_key_key,
            &redact_credential(endpoint),
            source_of(&api_key_key, &[api_key_env.as_str(), legacy_key]),
        ));
    }

    lines.push(render_line(
        "sync.batch_size",
        &config.sync.batch_size.to_string(),
        source_of("sync.batch_size", &["CLIENTSYNC_SYNC_BATCH_SIZE"]),
    ));
    lines.push(render_line(
        "sync.start_offset",
        &config.sync.start_offset.to_string(),
        source_of("sync.start_offset", &["CLIENTSYNC_SYNC_START_OFFSET"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source_of("logging.level", &["CLIENTSYNC_LOGGING_LEVEL", "CLIENTSYNC_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source_of("logging.format", &["CLIENTSYNC_LOGGING_FORMAT", "CLIENTSYNC_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then_some(path);
    }

    [PathBuf::from("clientsync.toml"), PathBuf::from("config/clientsync.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| read_env_present(key)) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn read_env_present(key: &str) -> bool {
    env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_credential(endpoint: &EndpointConfig) -> String {
    let credential = endpoint.api_key.expose_secret().trim();
    if credential.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((scheme, _)) = credential.split_once(' ') {
        return format!("{scheme} ***");
    }

    "<redacted>".to_string()
}
