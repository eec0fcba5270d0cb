//! Configuration management for the contract caller
//!
//! Loads configuration from TOML files with environment variable substitution.

use crate::chain::finality::DEVELOPMENT_CHAIN;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "CONTRACT_CALLER_CONFIG";

lazy_static! {
    static ref ENV_VAR_PATTERN: Regex =
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static pattern compiles");
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub finality: FinalityConfig,
    pub classifier: ClassifierConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FinalityConfig {
    /// Runtime chain names on which `InBlock` is terminal
    pub development_chains: Vec<String>,
    /// Give up waiting for the terminal status after this many seconds
    pub timeout_secs: Option<u64>,
}

impl Default for FinalityConfig {
    fn default() -> Self {
        Self {
            development_chains: vec![DEVELOPMENT_CHAIN.to_string()],
            timeout_secs: None,
        }
    }
}

impl FinalityConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Matches signer messages for a rejected signing request
    pub user_rejection_pattern: String,
    /// Extracts the numeric code from legacy RPC error text (first capture group)
    pub rpc_code_pattern: String,
    /// RPC code the chain uses to reject an extrinsic for insufficient balance
    pub insufficient_balance_code: i64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            user_rejection_pattern: r"(?i)user reject request".to_string(),
            rpc_code_pattern: r"(?i)RpcError: (\d+):".to_string(),
            insufficient_balance_code: 1010,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG`
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,contract_caller=debug".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings from the file named by `CONTRACT_CALLER_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path = env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&config_str)
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        // Substitute environment variables
        let config_str = substitute_env_vars(input);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.finality.timeout_secs == Some(0) {
            anyhow::bail!("finality.timeout_secs must be greater than zero");
        }

        if self
            .finality
            .development_chains
            .iter()
            .any(|name| name.trim().is_empty())
        {
            anyhow::bail!("finality.development_chains must not contain empty names");
        }

        Regex::new(&self.classifier.user_rejection_pattern)
            .with_context(|| "Invalid classifier.user_rejection_pattern")?;

        let rpc_code = Regex::new(&self.classifier.rpc_code_pattern)
            .with_context(|| "Invalid classifier.rpc_code_pattern")?;
        if rpc_code.captures_len() < 2 {
            anyhow::bail!("classifier.rpc_code_pattern needs a capture group for the code");
        }

        if self.finality.development_chains.is_empty() {
            tracing::warn!("No development chains configured - every chain waits for finality");
        }

        Ok(())
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();

    for cap in ENV_VAR_PATTERN.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
