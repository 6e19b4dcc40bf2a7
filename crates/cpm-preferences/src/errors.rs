//! # Error Types
//!
//! All error types for the preference contract.
//!
//! Outbound adapters report [`LedgerError`], [`IdentityError`] and
//! [`EventError`]; handlers lift them into the [`ContractError`] taxonomy,
//! which is what callers see as the error string of a failed invocation.

use crate::domain::entities::EXPECTED_JSON_TEMPLATE;
use thiserror::Error;

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors from the world-state and rich-query ports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Reading a key failed.
    #[error("read failed: {0}")]
    Read(String),

    /// Writing a key failed.
    #[error("write failed: {0}")]
    Write(String),

    /// Deleting a key failed.
    #[error("delete failed: {0}")]
    Delete(String),

    /// Opening or stepping a query iterator failed.
    #[error("query failed: {0}")]
    Query(String),

    /// Ledger lock was poisoned by a panicking writer.
    #[error("ledger lock poisoned")]
    LockPoisoned,

    /// Ledger peer is not reachable.
    #[error("ledger unavailable")]
    Unavailable,
}

// =============================================================================
// IDENTITY ERRORS
// =============================================================================

/// Errors resolving the caller's organization from its credential.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// No certificate was presented with the invocation.
    #[error("no client certificate presented")]
    MissingCertificate,

    /// The certificate issuer carries no organization entry.
    #[error("certificate issuer has no organization")]
    NoOrganization,
}

// =============================================================================
// EVENT ERRORS
// =============================================================================

/// Errors from the event emission primitive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Event name was empty.
    #[error("event name must not be empty")]
    EmptyName,

    /// The sink refused the event.
    #[error("event rejected: {0}")]
    Rejected(String),
}

// =============================================================================
// FORMAT VIOLATIONS
// =============================================================================

/// Field-format rules a submission can break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatViolation {
    /// `msisdn` contains a non-digit or is empty.
    MsisdnNotNumeric,
    /// `msisdn` is shorter than the configured minimum.
    MsisdnTooShort,
    /// `lrn` contains a non-digit or is empty.
    LrnNotNumeric,
}

impl FormatViolation {
    /// JSON-shaped message returned by single-record operations.
    #[must_use]
    pub fn json_message(self) -> &'static str {
        match self {
            Self::MsisdnNotNumeric => r#"{"Error":"MSISDN is not numeric"}"#,
            Self::MsisdnTooShort => r#"{"Error":"MSISDN is not a valid length"}"#,
            Self::LrnNotNumeric => r#"{"Error":"LRN is not numeric"}"#,
        }
    }

    /// Detail text recorded in a batch error entry.
    #[must_use]
    pub fn batch_detail(self) -> &'static str {
        match self {
            Self::MsisdnNotNumeric => "MobileNumber must contain only numeric characters",
            Self::MsisdnTooShort => "MobileNumber is not a valid length",
            Self::LrnNotNumeric => "Lrn must contain only numeric characters",
        }
    }

    /// Whether the offending field is the lrn rather than the msisdn.
    #[must_use]
    pub fn concerns_lrn(self) -> bool {
        matches!(self, Self::LrnNotNumeric)
    }
}

// =============================================================================
// CONTRACT ERRORS
// =============================================================================

/// Invocation-level error taxonomy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Wrong argument count or wrong field set.
    #[error("Incorrect Number Of Arguments, {0}")]
    Schema(String),

    /// Non-numeric or too-short msisdn, or non-numeric lrn.
    #[error("{}", .0.json_message())]
    Format(FormatViolation),

    /// Caller organization is not the recorded owner.
    #[error("Unauthorized Access")]
    Unauthorized {
        /// Record key the caller tried to mutate.
        phone: String,
        /// Caller organization.
        caller: String,
        /// Recorded owner.
        owner: String,
    },

    /// Caller organization could not be resolved.
    #[error("Getting certificate Details Error : {0}")]
    Identity(#[from] IdentityError),

    /// World-state or query access failed.
    #[error("{operation} Failed for MSISDN : {key} , Error : {source}")]
    LedgerAccess {
        /// Ledger primitive that failed.
        operation: &'static str,
        /// Key (or selector) involved.
        key: String,
        /// Underlying ledger error.
        source: LedgerError,
    },

    /// Encoding or decoding failed.
    #[error("Serialization Error : {0}")]
    Serialization(String),

    /// Emission primitive failed after the mutation was issued.
    #[error("Event Creation Error for EventID : {event} ({source})")]
    EventEmission {
        /// Event name that could not be emitted.
        event: &'static str,
        /// Underlying emission error.
        source: EventError,
    },

    /// Operation name not recognised.
    #[error("Unknown Function Invoked '{0}', Available Function argument shall be any one of : sp,abp,dp,po,qp")]
    UnknownOperation(String),
}

impl ContractError {
    /// Schema error for a record that does not carry exactly the 11 fields.
    #[must_use]
    pub fn field_set() -> Self {
        Self::Schema(format!("Expected json structure : {EXPECTED_JSON_TEMPLATE}"))
    }

    /// Schema error for a wrong positional argument count.
    #[must_use]
    pub fn argument_count(expected: &str) -> Self {
        Self::Schema(format!("Expected {expected}"))
    }

    /// Whether a batch records this error against the item and keeps going.
    ///
    /// Everything else means the environment is unreliable and aborts the
    /// whole submission.
    #[must_use]
    pub fn is_item_level(&self) -> bool {
        matches!(
            self,
            Self::Schema(_) | Self::Format(_) | Self::Unauthorized { .. }
        )
    }

    /// Message text placed in an error response.
    ///
    /// Format violations are returned bare (JSON-shaped); everything else is
    /// prefixed with the handler label.
    #[must_use]
    pub fn response_message(&self, label: &str) -> String {
        match self {
            Self::Format(_) | Self::Unauthorized { .. } | Self::UnknownOperation(_) => {
                self.to_string()
            }
            _ => format!("{label} : {self}"),
        }
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
