//! # Event Schema
//!
//! Notification names and payloads emitted on successful mutations, plus the
//! batch error entry reported for rejected items.
//!
//! | Event | Emitted by | `data` |
//! |-------|-----------|--------|
//! | `ADD-PREFERENCES` | `sp`, `abp` on an absent phone | stored record JSON |
//! | `UPDATE-PREFERENCES` | `sp`, `abp` on an owned phone | stored record JSON |
//! | `DELETE-PREFERENCES` | `dp` | the phone |
//! | `PORT-OUT` | `po` | stored record JSON |

use crate::domain::services::SetKind;
use serde::{Deserialize, Serialize};

// =============================================================================
// EVENT NAMES
// =============================================================================

/// Event names as seen by ledger event listeners.
pub mod topics {
    /// A preference was created.
    pub const ADD_PREFERENCES: &str = "ADD-PREFERENCES";

    /// An owned preference was replaced.
    pub const UPDATE_PREFERENCES: &str = "UPDATE-PREFERENCES";

    /// A preference was churned out.
    pub const DELETE_PREFERENCES: &str = "DELETE-PREFERENCES";

    /// A preference moved to a new service provider.
    pub const PORT_OUT: &str = "PORT-OUT";
}

/// Kind of successful mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreferenceEvent {
    Added,
    Updated,
    Deleted,
    PortedOut,
}

impl PreferenceEvent {
    /// Event name for this mutation.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Added => topics::ADD_PREFERENCES,
            Self::Updated => topics::UPDATE_PREFERENCES,
            Self::Deleted => topics::DELETE_PREFERENCES,
            Self::PortedOut => topics::PORT_OUT,
        }
    }
}

impl From<SetKind> for PreferenceEvent {
    fn from(kind: SetKind) -> Self {
        match kind {
            SetKind::Created => Self::Added,
            SetKind::Updated => Self::Updated,
        }
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// Payload of every emitted event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Stored record JSON, or the phone for deletions.
    pub data: String,
    /// Transaction id of the invocation that emitted it.
    pub txid: String,
}

/// One rejected batch item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemError {
    /// Offending value: the raw item, or the bad msisdn / lrn.
    pub data: String,
    /// Why the item was rejected.
    #[serde(rename = "error")]
    pub error_details: String,
}

/// An event as it left the contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedEvent {
    pub name: String,
    pub payload: Vec<u8>,
}

impl EmittedEvent {
    /// Decode the payload.
    ///
    /// # Errors
    ///
    /// Returns the decode error if the payload is not an [`EventPayload`].
    pub fn decode(&self) -> Result<EventPayload, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
