//! # Record Validation
//!
//! Schema and field-format rules for submitted preference records.
//! Pure predicates: nothing here touches the ledger.
//!
//! Rules are checked in a fixed order and the first failure is reported:
//!
//! 1. Exactly the 11 required keys, each a JSON string (schema)
//! 2. `msisdn` entirely numeric (format)
//! 3. `msisdn` at least `min_msisdn_length` characters (format)
//! 4. `lrn` entirely numeric (format)

use crate::domain::entities::{fields, PreferenceSubmission, REQUIRED_FIELDS};
use crate::errors::{ContractError, FormatViolation};
use serde_json::{Map, Value};

/// Default minimum subscriber-number length.
pub const DEFAULT_MIN_MSISDN_LENGTH: usize = 10;

/// Decoded key-value map purporting to be a preference.
pub type RawRecord = Map<String, Value>;

/// Decode one argument into a key-value map.
///
/// # Errors
///
/// [`ContractError::Serialization`] if the argument is not a JSON object.
pub fn parse_record(arg: &str) -> Result<RawRecord, ContractError> {
    Ok(serde_json::from_str::<RawRecord>(arg)?)
}

/// True when `value` is non-empty and made only of ASCII digits.
#[must_use]
pub fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Enforces the submission schema and field formats.
#[derive(Debug, Clone, Copy)]
pub struct RecordValidator {
    min_msisdn_length: usize,
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MSISDN_LENGTH)
    }
}

impl RecordValidator {
    /// Validator with a custom minimum msisdn length.
    #[must_use]
    pub fn new(min_msisdn_length: usize) -> Self {
        Self { min_msisdn_length }
    }

    /// Check an msisdn on its own (used by port-out).
    ///
    /// # Errors
    ///
    /// The first [`FormatViolation`] found.
    pub fn check_msisdn(&self, msisdn: &str) -> Result<(), FormatViolation> {
        if !is_numeric(msisdn) {
            return Err(FormatViolation::MsisdnNotNumeric);
        }
        if msisdn.len() < self.min_msisdn_length {
            return Err(FormatViolation::MsisdnTooShort);
        }
        Ok(())
    }

    /// Check an lrn on its own.
    ///
    /// # Errors
    ///
    /// [`FormatViolation::LrnNotNumeric`].
    pub fn check_lrn(&self, lrn: &str) -> Result<(), FormatViolation> {
        if is_numeric(lrn) {
            Ok(())
        } else {
            Err(FormatViolation::LrnNotNumeric)
        }
    }

    /// Validate a decoded record into a submission.
    ///
    /// # Errors
    ///
    /// [`ContractError::Schema`] for a wrong field set, [`ContractError::Format`]
    /// for a malformed msisdn or lrn.
    pub fn validate(&self, record: &RawRecord) -> Result<PreferenceSubmission, ContractError> {
        if record.len() != REQUIRED_FIELDS.len() {
            return Err(ContractError::field_set());
        }
        let field = |name: &str| -> Result<String, ContractError> {
            match record.get(name) {
                Some(Value::String(s)) => Ok(s.clone()),
                _ => Err(ContractError::field_set()),
            }
        };

        let submission = PreferenceSubmission {
            phone: field(fields::MSISDN)?,
            service_provider: field(fields::SERVICE_PROVIDER)?,
            request_number: field(fields::REQUEST_NUMBER)?,
            registration_mode: field(fields::REGISTRATION_MODE)?,
            category: field(fields::CATEGORY)?,
            communication_mode: field(fields::COMMUNICATION_MODE)?,
            day_type: field(fields::DAY_TYPE)?,
            day_time_band: field(fields::DAY_TIME_BAND)?,
            lrn: field(fields::LRN)?,
            update_ts: field(fields::UPDATE_TS)?,
            create_ts: field(fields::CREATE_TS)?,
        };

        self.check_msisdn(&submission.phone)
            .and_then(|()| self.check_lrn(&submission.lrn))
            .map_err(ContractError::Format)?;

        Ok(submission)
    }
}

// =============================================================================
// TESTS
// =============================================================================
