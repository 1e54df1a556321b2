//! Process configuration, read from `CAMPUSGATE_*` environment variables.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Deployment environment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Production,
    Development,
    Test,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            other => Err(ConfigError::invalid(
                "CAMPUSGATE_ENV",
                other,
                "production, development, test",
            )),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::invalid("CAMPUSGATE_LOG_FORMAT", other, "json, pretty")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub environment: Environment,
    /// Prefix marking non-production credentials that skip expiry checks.
    ///
    /// Only honoured outside production.
    pub synthetic_credential_prefix: String,
    /// Shell title used when a destination declares none.
    pub default_title: String,
    /// Upper bound on guard redirects followed while settling one navigation.
    pub max_redirect_hops: usize,
    pub log: LogConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            synthetic_credential_prefix: "mock_".to_string(),
            default_title: "Interdisciplinary PBL Platform".to_string(),
            max_redirect_hops: 8,
            log: LogConfig::default(),
        }
    }
}

impl GateConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        match lookup("CAMPUSGATE_ENV") {
            Some(raw) => config.environment = raw.parse()?,
            None => tracing::warn!("CAMPUSGATE_ENV not set; assuming production"),
        }

        if let Some(prefix) = lookup("CAMPUSGATE_SYNTHETIC_PREFIX") {
            config.synthetic_credential_prefix = prefix;
        }
        if let Some(title) = lookup("CAMPUSGATE_DEFAULT_TITLE") {
            config.default_title = title;
        }
        if let Some(level) = lookup("CAMPUSGATE_LOG") {
            config.log.level = level;
        }
        if let Some(format) = lookup("CAMPUSGATE_LOG_FORMAT") {
            config.log.format = format.parse()?;
        }
        if let Some(hops) = lookup("CAMPUSGATE_MAX_REDIRECTS") {
            config.max_redirect_hops = hops.trim().parse().map_err(|_| {
                ConfigError::invalid("CAMPUSGATE_MAX_REDIRECTS", hops.clone(), "a non-negative integer")
            })?;
        }

        Ok(config)
    }

    /// Synthetic credential prefix, if this environment allows synthetic credentials.
    pub fn synthetic_prefix(&self) -> Option<&str> {
        if self.environment.is_production() || self.synthetic_credential_prefix.is_empty() {
            None
        } else {
            Some(&self.synthetic_credential_prefix)
        }
    }
}
