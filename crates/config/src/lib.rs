//! Configuration for the school risk & forecasting pipeline.
//!
//! Two layers, loaded independently:
//! - [`EnvConfig`]: connection/runtime settings from the process environment.
//! - [`PolicyConfig`]: the policy constants of spec §6 (norm tables, risk
//!   weights, budget caps, ...), with defaults baked in and an optional TOML
//!   file (`--config path`) overriding the keys it names.

pub mod policy;

use std::env;
use std::path::Path;

use thiserror::Error;

pub use policy::{
    BudgetConfig, ComplianceGrades, NormTable, PolicyConfig, PriorityBuckets, ProposalNoiseRange,
    RiskBands, RiskWeights,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid policy configuration: {0}")]
    Validation(String),
}

/// Environment-sourced runtime configuration.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Per-batch statement timeout (spec §5 default 120s).
    pub batch_statement_timeout_secs: u64,
    /// Max transient-error retries per batch (spec §4 "Failure semantics").
    pub max_batch_retries: u32,
}

impl EnvConfig {
    /// Load configuration from environment variables (`.env` is loaded first, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env_var("DATABASE_URL")?,
            batch_statement_timeout_secs: env_var_or("BATCH_STATEMENT_TIMEOUT_SECS", "120")
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue(
                        "BATCH_STATEMENT_TIMEOUT_SECS".to_string(),
                        "expected an integer".to_string(),
                    )
                })?,
            max_batch_retries: env_var_or("MAX_BATCH_RETRIES", "2")
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue(
                        "MAX_BATCH_RETRIES".to_string(),
                        "expected an integer".to_string(),
                    )
                })?,
        })
    }
}

fn env_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Load the policy configuration, starting from defaults and overlaying
/// values from an optional TOML file.
pub fn load_policy(path: Option<&Path>) -> Result<PolicyConfig, ConfigError> {
    let policy = match path {
        None => PolicyConfig::default(),
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        }
    };

    policy
        .validate_cross_fields()
        .map_err(ConfigError::Validation)?;

    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_or_uses_default() {
        let val = env_var_or("NON_EXISTENT_VAR_12345", "default_value");
        assert_eq!(val, "default_value");
    }

    #[test]
    fn default_policy_passes_validation() {
        let policy = PolicyConfig::default();
        assert!(policy.validate_cross_fields().is_ok());
    }

    #[test]
    fn load_policy_without_path_returns_defaults() {
        let policy = load_policy(None).expect("defaults must validate");
        assert_eq!(policy.risk_bands.critical, 0.60);
    }

    #[test]
    fn load_policy_overlays_partial_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "volatile_threshold = 0.25\n").expect("write config");

        let policy = load_policy(Some(&path)).expect("policy should load");
        assert_eq!(policy.volatile_threshold, 0.25);
        // Untouched fields keep their defaults.
        assert_eq!(policy.risk_bands.critical, 0.60);
    }
}
