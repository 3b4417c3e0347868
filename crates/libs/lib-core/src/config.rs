//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! The server builds one [`Config`] at startup and hands the pieces it needs to the
//! store ([`StoreConfig`]) and to the AI client. Nothing reads the environment after that.
//!
//! ```rust,no_run
//! use lib_core::config::Config;
//!
//! let config = Config::from_env().expect("config");
//! config.validate().expect("valid config");
//! let store_config = config.store_config();
//! ```

use std::time::Duration;

use lib_utils::envs::{get_env_bool, get_env_list, get_env_or, get_env_parse, Error as EnvError};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3001";
const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TYPING_TIMEOUT_MS: u64 = 3000;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// Socket address the HTTP server listens on
    pub bind_address: String,

    /// Origins accepted by the CORS layer
    pub allowed_origins: Vec<String>,

    /// Hugging Face Inference API credential
    ///
    /// May be empty; requests are then sent unauthenticated and will usually fail,
    /// which the handlers turn into fallback responses.
    pub huggingface_api_key: String,

    /// Base URL model ids are appended to
    pub huggingface_api_url: String,

    /// Timeout for a single inference request, in seconds
    ///
    /// Valid range: 1-300
    pub ai_request_timeout_secs: u64,

    /// How long a typing indicator survives without a refresh, in milliseconds
    ///
    /// Valid range: 100-60000
    pub typing_timeout_ms: u64,

    /// Seed demo users, rooms and messages at startup
    pub seed_sample_data: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let bind_address = get_env_or("BIND_ADDRESS", DEFAULT_BIND_ADDRESS);

        let allowed_origins = get_env_list("ALLOWED_ORIGINS").unwrap_or_else(|| {
            vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:8080".to_string(),
            ]
        });

        let huggingface_api_key = get_env_or("HUGGINGFACE_API_KEY", "");
        let huggingface_api_url = get_env_or("HUGGINGFACE_API_URL", DEFAULT_HF_API_URL)
            .trim_end_matches('/')
            .to_string();

        let ai_request_timeout_secs =
            parse_or_default("AI_REQUEST_TIMEOUT_SECS", DEFAULT_AI_TIMEOUT_SECS)?;
        let typing_timeout_ms = parse_or_default("TYPING_TIMEOUT_MS", DEFAULT_TYPING_TIMEOUT_MS)?;

        let seed_sample_data =
            get_env_bool("SEED_SAMPLE_DATA", true).map_err(|e| e.to_string())?;

        Ok(Self {
            bind_address,
            allowed_origins,
            huggingface_api_key,
            huggingface_api_url,
            ai_request_timeout_secs,
            typing_timeout_ms,
            seed_sample_data,
        })
    }

    /// Validate configuration values against business rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("BIND_ADDRESS '{}' is not a valid socket address", self.bind_address));
        }

        if !self.huggingface_api_url.starts_with("http://")
            && !self.huggingface_api_url.starts_with("https://")
        {
            return Err("HUGGINGFACE_API_URL must be an http(s) URL".to_string());
        }

        if !(1..=300).contains(&self.ai_request_timeout_secs) {
            return Err("AI_REQUEST_TIMEOUT_SECS must be between 1 and 300".to_string());
        }

        if !(100..=60_000).contains(&self.typing_timeout_ms) {
            return Err("TYPING_TIMEOUT_MS must be between 100 and 60000".to_string());
        }

        Ok(())
    }

    /// Store settings derived from this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            typing_ttl: Duration::from_millis(self.typing_timeout_ms),
        }
    }

    pub fn ai_request_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            huggingface_api_key: String::new(),
            huggingface_api_url: DEFAULT_HF_API_URL.to_string(),
            ai_request_timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
            typing_timeout_ms: DEFAULT_TYPING_TIMEOUT_MS,
            seed_sample_data: true,
        }
    }
}

/// Settings consumed by [`ChatStore`](crate::model::store::ChatStore).
#[derive(Clone, Copy, Debug)]
pub struct StoreConfig {
    /// Lifetime of a typing indicator without refresh
    pub typing_ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            typing_ttl: Duration::from_millis(DEFAULT_TYPING_TIMEOUT_MS),
        }
    }
}

fn parse_or_default(name: &'static str, default: u64) -> Result<u64, String> {
    match get_env_parse::<u64>(name) {
        Ok(value) => Ok(value),
        Err(EnvError::MissingEnv(_)) => Ok(default),
        Err(e) => Err(e.to_string()),
    }
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store_config().typing_ttl, Duration::from_millis(3000));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let config = Config {
            typing_timeout_ms: 50,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            ai_request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            bind_address: "not-an-address".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
// endregion: --- Tests
