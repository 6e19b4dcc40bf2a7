//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the contract depends on. The ledger peer provides them:
//! - Key-value world-state access
//! - Rich queries over world-state
//! - Caller identity from the client certificate
//! - Event emission on the proposed transaction

use crate::errors::{EventError, IdentityError, LedgerError};
use async_trait::async_trait;

// =============================================================================
// WORLD STATE
// =============================================================================

/// Key-value access to the ledger's current state.
///
/// Writes land in the transaction's write-set; visibility and conflict
/// detection are the ledger's concern.
#[async_trait]
pub trait WorldState: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Returns
    ///
    /// * `Some(bytes)` - If the key exists
    /// * `None` - If the key was never written or has been deleted
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Write `value` under `key`, overwriting anything already there.
    async fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn del_state(&self, key: &str) -> Result<(), LedgerError>;
}

// =============================================================================
// RICH QUERY
// =============================================================================

/// A world-state entry returned by a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    /// World-state key.
    pub key: String,
    /// Stored bytes, untouched.
    pub value: Vec<u8>,
}

/// Forward-only cursor over query results.
///
/// Holds ledger resources until [`close`](StateQueryIterator::close) is
/// called.
#[async_trait]
pub trait StateQueryIterator: Send {
    /// Advance the cursor. `None` once the results are exhausted.
    async fn next_entry(&mut self) -> Result<Option<KeyValue>, LedgerError>;

    /// Release the cursor. Calling it twice is a no-op.
    fn close(&mut self);
}

/// Opaque selector queries against world-state.
#[async_trait]
pub trait RichQuery: Send + Sync {
    /// Run `query` verbatim and return a cursor over the matches.
    async fn get_query_result(
        &self,
        query: &str,
    ) -> Result<Box<dyn StateQueryIterator>, LedgerError>;
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Resolves the invoking client's credential.
pub trait IdentityResolver: Send + Sync {
    /// Organization entries of the client certificate's issuer, in order.
    ///
    /// # Errors
    ///
    /// [`IdentityError`] if no certificate is attached or it cannot be read.
    fn issuer_organizations(&self) -> Result<Vec<String>, IdentityError>;
}

// =============================================================================
// EVENTS
// =============================================================================

/// Attaches a named event to the proposed transaction.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emit `payload` under `name`.
    async fn set_event(&self, name: &str, payload: Vec<u8>) -> Result<(), EventError>;
}
