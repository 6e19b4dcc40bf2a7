//! Contract configuration from environment variables.

use crate::domain::validation::{RecordValidator, DEFAULT_MIN_MSISDN_LENGTH};
use std::env;

/// Default separator between batch error entries.
pub const DEFAULT_BATCH_DELIMITER: &str = "|";

/// Tunables of the preference contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    /// Minimum msisdn length accepted by `sp`, `abp` and `po`.
    pub min_msisdn_length: usize,

    /// Separator placed between error entries in a batch outcome.
    pub batch_error_delimiter: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            min_msisdn_length: DEFAULT_MIN_MSISDN_LENGTH,
            batch_error_delimiter: DEFAULT_BATCH_DELIMITER.to_string(),
        }
    }
}

impl ContractConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CPM_MIN_MSISDN_LENGTH`: Minimum msisdn length (default: 10)
    /// - `CPM_BATCH_DELIMITER`: Batch error separator (default: `|`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Unparseable or empty values fall back to the defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            min_msisdn_length: lookup("CPM_MIN_MSISDN_LENGTH")
                .and_then(|v| v.trim().parse().ok())
                .filter(|len| *len > 0)
                .unwrap_or(defaults.min_msisdn_length),

            batch_error_delimiter: lookup("CPM_BATCH_DELIMITER")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.batch_error_delimiter),
        }
    }

    /// Validator honouring this configuration.
    #[must_use]
    pub fn validator(&self) -> RecordValidator {
        RecordValidator::new(self.min_msisdn_length)
    }
}
