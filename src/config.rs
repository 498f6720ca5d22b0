//! Configuration management for Roastmaster
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Loaded once at process start; the rest of the crate receives resolved values.

use crate::error::{AppError, AppResult};
use crate::roast::RoastLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Upper bound for every timeout setting, in seconds
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on a whole `/roast` call, including provider latency
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

/// Chat-completion provider settings
///
/// Fields are private; values are validated by [`Config::validate`] and
/// immutable afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    base_url: String,
    model: String,
    #[serde(default = "default_api_key_env")]
    api_key_env: String,
    /// Sent as `HTTP-Referer` when set
    #[serde(default)]
    referer: Option<String>,
    /// Sent as `X-Title` when set
    #[serde(default)]
    title: Option<String>,
    #[serde(default = "default_provider_timeout")]
    timeout_seconds: u64,
}

impl ProviderConfig {
    /// Provider base URL, e.g. `https://openrouter.ai/api/v1`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Name of the environment variable holding the bearer credential
    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    pub fn referer(&self) -> Option<&str> {
        self.referer.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Transport-level timeout for one provider call
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// Read the credential from the configured environment variable
    ///
    /// # Errors
    ///
    /// Returns `AppError::MissingCredential` if the variable is unset or blank.
    pub fn resolve_api_key(&self) -> AppResult<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AppError::MissingCredential {
                env_var: self.api_key_env.clone(),
            }),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_provider_timeout() -> u64 {
    30
}

/// Fixed sampling parameters for every roast
///
/// Not user-controllable, to bound cost and response length.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompletionConfig {
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default = "default_temperature")]
    temperature: f64,
    #[serde(default = "default_level")]
    default_level: RoastLevel,
}

impl CompletionConfig {
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Level used when a caller does not pick one
    pub fn default_level(&self) -> RoastLevel {
        self.default_level
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            default_level: default_level(),
        }
    }
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f64 {
    0.9
}

fn default_level() -> RoastLevel {
    RoastLevel::Savage
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        // Phase 1: Read file (preserves io::Error context)
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 2: Parse TOML (preserves toml::de::Error context)
        let config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        // Phase 3: Validate parsed config (provides contextual reason)
        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        tracing::debug!(
            model = %config.provider.model(),
            base_url = %config.provider.base_url(),
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Validate configuration after parsing
    ///
    /// Called by `from_file()` and `from_str()`; call it explicitly when
    /// building a `Config` by other means.
    pub fn validate(&self) -> AppResult<()> {
        let provider = &self.provider;

        if !provider.base_url.starts_with("http://") && !provider.base_url.starts_with("https://")
        {
            return Err(AppError::Config(format!(
                "provider.base_url '{}' must start with 'http://' or 'https://'",
                provider.base_url
            )));
        }

        if provider.model.trim().is_empty() {
            return Err(AppError::Config(
                "provider.model must not be empty".to_string(),
            ));
        }

        if provider.api_key_env.trim().is_empty() {
            return Err(AppError::Config(
                "provider.api_key_env must name an environment variable".to_string(),
            ));
        }

        if self.completion.max_tokens == 0 {
            return Err(AppError::Config(
                "completion.max_tokens must be greater than 0".to_string(),
            ));
        }

        let temperature = self.completion.temperature;
        if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::Config(format!(
                "completion.temperature must be a finite number between 0.0 and 2.0, got {}",
                temperature
            )));
        }

        for (name, value) in [
            ("server.request_timeout_seconds", self.server.request_timeout_seconds),
            ("provider.timeout_seconds", provider.timeout_seconds),
        ] {
            if value == 0 {
                return Err(AppError::Config(format!("{} must be greater than 0", name)));
            }
            if value > MAX_TIMEOUT_SECONDS {
                return Err(AppError::Config(format!(
                    "{} cannot exceed {} seconds, got {}",
                    name, MAX_TIMEOUT_SECONDS, value
                )));
            }
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}
