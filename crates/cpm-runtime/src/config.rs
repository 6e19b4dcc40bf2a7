//! # Runtime Configuration
//!
//! Caller identity and channel for the local host, plus the contract's own
//! tunables.

use cpm_preferences::config::ContractConfig;
use std::env;

/// Default channel name.
pub const DEFAULT_CHANNEL: &str = "cpm-channel";

/// Default caller organization.
pub const DEFAULT_CALLER_ORG: &str = "Org1MSP";

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Issuer organizations of the default caller, comma-separated.
    pub caller_orgs: String,
    /// Channel the contract is deployed on. Only used for logging.
    pub channel: String,
    /// Contract tunables.
    pub contract: ContractConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            caller_orgs: DEFAULT_CALLER_ORG.to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
            contract: ContractConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Organization list of the default caller.
    #[must_use]
    pub fn organizations(&self) -> Vec<String> {
        self.caller_orgs
            .split(',')
            .map(str::trim)
            .filter(|org| !org.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Load configuration from the environment.
///
/// # Environment Variables
///
/// - `CPM_CALLER_ORG`: Default caller's issuer organizations (default: Org1MSP)
/// - `CPM_CHANNEL`: Channel name (default: cpm-channel)
/// - `CPM_MIN_MSISDN_LENGTH`, `CPM_BATCH_DELIMITER`: see [`ContractConfig::from_env`]
#[must_use]
pub fn load_config() -> RuntimeConfig {
    let mut config = RuntimeConfig {
        contract: ContractConfig::from_env(),
        ..RuntimeConfig::default()
    };

    if let Ok(orgs) = env::var("CPM_CALLER_ORG") {
        config.caller_orgs = orgs;
    }
    if let Ok(channel) = env::var("CPM_CHANNEL") {
        if !channel.trim().is_empty() {
            config.channel = channel;
        }
    }

    config
}
