//! Configuration management for the Recycling Commerce Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with RCM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Snapshot storage configuration
    pub storage: StorageConfig,

    /// Quotation ledger configuration
    pub quotation: QuotationConfig,

    /// Warehouse matching configuration
    pub matching: MatchingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the JSON snapshot stores
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuotationConfig {
    /// Default validity window for new codes, in hours
    pub valid_hours: i64,

    /// Days past expiration before an expired code is purged
    pub retention_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    /// Maximum distance between user and warehouse, in km
    pub max_distance_km: f64,

    /// Maximum number of candidate warehouses returned
    pub result_limit: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("RCM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("storage.data_dir", "./data")?
            .set_default("quotation.valid_hours", 24)?
            .set_default("quotation.retention_days", 7)?
            .set_default("matching.max_distance_km", 5.0)?
            .set_default("matching.result_limit", 3)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (RCM_ prefix)
            .add_source(
                Environment::with_prefix("RCM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for QuotationConfig {
    fn default() -> Self {
        Self {
            valid_hours: 24,
            retention_days: 7,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_distance_km: 5.0,
            result_limit: 3,
        }
    }
}
