//! Environment configuration
//!
//! Five Azure settings are required; the server refuses to start without
//! them. Everything else has a default.

use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("One or more required environment variables are missing: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Connection settings for the Azure `OpenAI` resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureConfig {
    pub endpoint: String,
    pub api_key: String,
    pub image_deployment: String,
    pub chat_deployment: String,
    pub api_version: String,
}

/// Full editor configuration
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub azure: AzureConfig,
    pub port: u16,
    pub session_ttl: Duration,
    pub request_timeout: Duration,
}

impl EditorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |name: &'static str| -> String {
            match lookup(name).filter(|v| !v.trim().is_empty()) {
                Some(value) => value,
                None => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let azure = AzureConfig {
            endpoint: required("AZURE_OPENAI_ENDPOINT"),
            api_key: required("AZURE_OPENAI_API_KEY"),
            image_deployment: required("AZURE_OPENAI_IMAGE_DEPLOYMENT"),
            chat_deployment: required("AZURE_OPENAI_CHAT_DEPLOYMENT"),
            api_version: required("AZURE_OPENAI_API_VERSION"),
        };

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let port = parse_optional(&lookup, "EDITOR_PORT")?.unwrap_or(DEFAULT_PORT);
        let session_ttl = parse_optional(&lookup, "EDITOR_SESSION_TTL_SECS")?
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);
        let request_timeout = parse_optional(&lookup, "EDITOR_REQUEST_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        if session_ttl == 0 || session_ttl < request_timeout {
            return Err(ConfigError::Invalid {
                name: "EDITOR_SESSION_TTL_SECS",
                value: session_ttl.to_string(),
            });
        }

        Ok(Self {
            azure,
            port,
            session_ttl: Duration::from_secs(session_ttl),
            request_timeout: Duration::from_secs(request_timeout),
        })
    }
}

fn parse_optional<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
