//! # Event Publisher
//!
//! Wraps mutation outcomes into `{data, txid}` payloads and hands them to
//! the [`EventSink`].

use crate::domain::value_objects::TxId;
use crate::errors::ContractError;
use crate::events::{EventPayload, PreferenceEvent};
use crate::ports::outbound::EventSink;
use std::sync::Arc;
use tracing::{debug, error};

/// Emits one notification per successful mutation.
pub struct EventPublisher<E: EventSink> {
    sink: Arc<E>,
}

impl<E: EventSink> Clone for EventPublisher<E> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<E: EventSink> EventPublisher<E> {
    pub fn new(sink: Arc<E>) -> Self {
        Self { sink }
    }

    /// Emit `event` carrying `data`.
    ///
    /// The store mutation that precedes this call is not undone if emission
    /// fails.
    ///
    /// # Errors
    ///
    /// [`ContractError::Serialization`] if the payload cannot be encoded,
    /// [`ContractError::EventEmission`] if the sink refuses it.
    pub async fn publish(
        &self,
        event: PreferenceEvent,
        data: String,
        tx_id: &TxId,
    ) -> Result<(), ContractError> {
        let payload = serde_json::to_vec(&EventPayload {
            data,
            txid: tx_id.to_string(),
        })?;

        self.sink
            .set_event(event.name(), payload)
            .await
            .map_err(|source| {
                error!(event = event.name(), error = %source, "Event emission failed");
                ContractError::EventEmission {
                    event: event.name(),
                    source,
                }
            })?;

        debug!(event = event.name(), "Event emitted");
        Ok(())
    }
}
