use std::{collections::HashMap, fs, time::Duration};

use anyhow::Context;
use client_core::transport::{TransportConfig, DEFAULT_BASE_URL};

const SETTINGS_FILE: &str = "browse.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.into(),
            connect_timeout_secs: 15,
            request_timeout_secs: 15,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "ignoring unparsable settings file");
        return;
    };

    if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
        settings.api_base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("connect_timeout_secs").and_then(seconds) {
        settings.connect_timeout_secs = v;
    }
    if let Some(v) = file_cfg.get("request_timeout_secs").and_then(seconds) {
        settings.request_timeout_secs = v;
    }
}

fn seconds(value: &toml::Value) -> Option<u64> {
    match value {
        toml::Value::Integer(v) => u64::try_from(*v).ok(),
        toml::Value::String(v) => v.trim().parse().ok(),
        _ => None,
    }
}

fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("LISTING_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__CONNECT_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.connect_timeout_secs = parsed;
        }
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

pub fn transport_config(settings: &Settings) -> anyhow::Result<TransportConfig> {
    let mut config = TransportConfig::parse(&settings.api_base_url)
        .with_context(|| format!("invalid listing api url '{}'", settings.api_base_url))?;
    config.connect_timeout = Duration::from_secs(settings.connect_timeout_secs);
    config.request_timeout = Duration::from_secs(settings.request_timeout_secs);
    Ok(config)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
