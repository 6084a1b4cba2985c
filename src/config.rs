use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected 'text' or 'json', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub backend_api_url: Url,
    pub backend_api_token: Option<String>,
    pub backend_timeout: Duration,
    pub bulk_concurrency: usize,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any key lookup, so parsing can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_timeout_secs: u64 = get_parse_or(&lookup, "BACKEND_TIMEOUT_SECS", 10)?;
        let bulk_concurrency: usize = get_parse_or(&lookup, "BULK_CONCURRENCY", 1)?;
        if bulk_concurrency == 0 {
            return Err(Error::Config(
                "Invalid value for BULK_CONCURRENCY: must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            server_address: get_required(&lookup, "SERVER_ADDRESS")?,
            backend_api_url: get_required_parse(&lookup, "BACKEND_API_URL")?,
            backend_api_token: lookup("BACKEND_API_TOKEN").filter(|v| !v.trim().is_empty()),
            backend_timeout: Duration::from_secs(backend_timeout_secs),
            bulk_concurrency,
            log_format: get_parse_or(&lookup, "LOG_FORMAT", LogFormat::Text)?,
        })
    }
}

fn get_required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_required_parse<F, T>(lookup: &F, name: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_required(lookup, name)?;
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn applies_defaults_for_optional_settings() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDRESS", "127.0.0.1:8080"),
            ("BACKEND_API_URL", "http://backend.local/api/"),
        ]))
        .expect("config");

        assert_eq!(config.server_address, "127.0.0.1:8080");
        assert_eq!(config.backend_api_url.as_str(), "http://backend.local/api/");
        assert_eq!(config.backend_api_token, None);
        assert_eq!(config.backend_timeout, Duration::from_secs(10));
        assert_eq!(config.bulk_concurrency, 1);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDRESS", "0.0.0.0:9000"),
            ("BACKEND_API_URL", "https://crm.example.com/v2"),
            ("BACKEND_API_TOKEN", "secret"),
            ("BACKEND_TIMEOUT_SECS", "3"),
            ("BULK_CONCURRENCY", "4"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .expect("config");

        assert_eq!(config.backend_api_token.as_deref(), Some("secret"));
        assert_eq!(config.backend_timeout, Duration::from_secs(3));
        assert_eq!(config.bulk_concurrency, 4);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_missing_and_malformed_values() {
        let missing = Config::from_lookup(lookup_from(&[("SERVER_ADDRESS", "127.0.0.1:8080")]));
        assert!(matches!(missing, Err(Error::Config(msg)) if msg.contains("BACKEND_API_URL")));

        let bad_url = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDRESS", "127.0.0.1:8080"),
            ("BACKEND_API_URL", "not a url"),
        ]));
        assert!(matches!(bad_url, Err(Error::Config(_))));

        let zero_bulk = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDRESS", "127.0.0.1:8080"),
            ("BACKEND_API_URL", "http://backend.local"),
            ("BULK_CONCURRENCY", "0"),
        ]));
        assert!(matches!(zero_bulk, Err(Error::Config(msg)) if msg.contains("BULK_CONCURRENCY")));
    }
}
