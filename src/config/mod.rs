//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `SCAMBAIT`
//! prefix and `__` as the nesting separator.
//!
//! # Example
//!
//! ```no_run
//! use scambait::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod engagement;
mod error;
mod providers;
mod report;
mod server;

pub use engagement::EngagementConfig;
pub use error::{ConfigError, ValidationError};
pub use providers::ProvidersConfig;
pub use report::ReportConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM provider keys and failover policy
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Engagement thresholds and sweeper timings
    #[serde(default)]
    pub engagement: EngagementConfig,

    /// Report submission endpoint
    #[serde(default)]
    pub report: ReportConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `.env` if present, then environment variables with the
    /// `SCAMBAIT` prefix and `__` separating nested values, e.g.
    /// `SCAMBAIT__SERVER__PORT=8080` or
    /// `SCAMBAIT__PROVIDERS__GROQ_API_KEYS=k1,k2`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a value cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SCAMBAIT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.providers.validate()?;
        self.engagement.validate()?;
        self.report.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
