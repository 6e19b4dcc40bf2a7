//! # Wire Format
//!
//! Input lines follow the peer CLI invocation shape:
//!
//! ```json
//! {"Args": ["sp", "{\"msisdn\":\"9876543210\", ...}"]}
//! {"Args": ["dp", "9876543210"], "Identity": ["Org2MSP"]}
//! ```
//!
//! `Identity` is optional and overrides the configured caller for that one
//! line. Output is one JSON object per line, tagged by `type`.

use cpm_preferences::events::EmittedEvent;
use cpm_preferences::ports::inbound::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Errors decoding an input line.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("request has an empty Args list")]
    EmptyArgs,
}

/// One decoded input line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeerRequest {
    /// Function name followed by its arguments.
    #[serde(rename = "Args")]
    pub args: Vec<String>,

    /// Caller issuer organizations for this request only.
    #[serde(rename = "Identity", default)]
    pub identity: Option<Vec<String>>,
}

impl PeerRequest {
    /// Decode a line.
    ///
    /// # Errors
    ///
    /// [`RequestError`] for invalid JSON or an empty `Args` list.
    pub fn parse(line: &str) -> Result<Self, RequestError> {
        let request: Self = serde_json::from_str(line)?;
        if request.args.is_empty() {
            return Err(RequestError::EmptyArgs);
        }
        Ok(request)
    }
}

/// One output line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputLine {
    /// Outcome of an invocation.
    Response {
        tx_id: String,
        function: String,
        status: i32,
        #[serde(skip_serializing_if = "String::is_empty")]
        message: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        payload: String,
    },
    /// Event emitted during an invocation.
    Event {
        tx_id: String,
        name: String,
        payload: Value,
    },
    /// Input line that could not be decoded.
    Rejected { line: usize, error: String },
}

impl OutputLine {
    #[must_use]
    pub fn response(tx_id: &str, function: &str, response: &Response) -> Self {
        Self::Response {
            tx_id: tx_id.to_string(),
            function: function.to_string(),
            status: response.status,
            message: response.message.clone(),
            payload: response.payload_str().into_owned(),
        }
    }

    /// Event line. Payloads that are not JSON are carried as a string.
    #[must_use]
    pub fn event(tx_id: &str, event: &EmittedEvent) -> Self {
        let payload = serde_json::from_slice(&event.payload).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&event.payload).into_owned())
        });
        Self::Event {
            tx_id: tx_id.to_string(),
            name: event.name.clone(),
            payload,
        }
    }
}

/// Transaction id: hex SHA-256 of a fresh nonce and the creator identity.
#[must_use]
pub fn new_tx_id(creator: &[String]) -> String {
    compute_tx_id(Uuid::new_v4().as_bytes(), creator)
}

/// Deterministic part of [`new_tx_id`].
#[must_use]
pub fn compute_tx_id(nonce: &[u8], creator: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    for org in creator {
        hasher.update(org.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
