//! # Preference Store
//!
//! Typed get / put / delete of [`Preference`] records against world-state,
//! keyed by msisdn. Ledger failures are tagged with the primitive that
//! failed and the key involved.

use crate::domain::entities::Preference;
use crate::errors::ContractError;
use crate::ports::outbound::WorldState;
use std::sync::Arc;
use tracing::debug;

/// Ledger primitive names used in error messages.
pub mod primitives {
    pub const GET_STATE: &str = "GetState";
    pub const PUT_STATE: &str = "PutState";
    pub const DEL_STATE: &str = "DelState";
}

/// Record-level view over world-state.
pub struct PreferenceStore<L: WorldState> {
    ledger: Arc<L>,
}

impl<L: WorldState> Clone for PreferenceStore<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<L: WorldState> PreferenceStore<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Load the record stored under `phone`.
    ///
    /// # Errors
    ///
    /// [`ContractError::LedgerAccess`] on read failure,
    /// [`ContractError::Serialization`] if the stored bytes do not decode.
    pub async fn get(&self, phone: &str) -> Result<Option<Preference>, ContractError> {
        let bytes = self
            .ledger
            .get_state(phone)
            .await
            .map_err(|source| ContractError::LedgerAccess {
                operation: primitives::GET_STATE,
                key: phone.to_string(),
                source,
            })?;

        match bytes {
            None => Ok(None),
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        }
    }

    /// Overwrite the record under its own `phone`.
    ///
    /// Returns the encoded record, which callers reuse as event data.
    ///
    /// # Errors
    ///
    /// [`ContractError::Serialization`] or [`ContractError::LedgerAccess`].
    pub async fn put(&self, record: &Preference) -> Result<String, ContractError> {
        let encoded = serde_json::to_string(record)?;
        self.ledger
            .put_state(&record.phone, encoded.clone().into_bytes())
            .await
            .map_err(|source| ContractError::LedgerAccess {
                operation: primitives::PUT_STATE,
                key: record.phone.clone(),
                source,
            })?;
        debug!(phone = %record.phone, "PutState success");
        Ok(encoded)
    }

    /// Remove the record under `phone`.
    ///
    /// # Errors
    ///
    /// [`ContractError::LedgerAccess`] on delete failure.
    pub async fn delete(&self, phone: &str) -> Result<(), ContractError> {
        self.ledger
            .del_state(phone)
            .await
            .map_err(|source| ContractError::LedgerAccess {
                operation: primitives::DEL_STATE,
                key: phone.to_string(),
                source,
            })
    }
}
