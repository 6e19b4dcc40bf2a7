//! # Query Gateway
//!
//! Forwards a selector to the ledger's query engine and renders the
//! matches as `[{"Key":<key>,"Record":<stored bytes>}, ...]`.
//!
//! Records are embedded exactly as stored, not re-encoded. The cursor is
//! closed when the gateway is done with it, whether the walk finished or
//! failed part-way.

use crate::errors::{ContractError, LedgerError};
use crate::ports::outbound::{RichQuery, StateQueryIterator};
use std::sync::Arc;
use tracing::debug;

/// Closes the wrapped cursor on drop.
struct CursorGuard(Box<dyn StateQueryIterator>);

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Runs rich queries and serializes their results.
pub struct QueryGateway<L: RichQuery> {
    ledger: Arc<L>,
}

impl<L: RichQuery> QueryGateway<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Execute `query` and return the JSON array of matches.
    ///
    /// # Errors
    ///
    /// [`ContractError::LedgerAccess`] if the query cannot be opened or a
    /// step fails; nothing collected so far is returned.
    pub async fn execute(&self, query: &str) -> Result<String, ContractError> {
        let access = |source: LedgerError| ContractError::LedgerAccess {
            operation: "GetQueryResult",
            key: query.to_string(),
            source,
        };

        let mut cursor = CursorGuard(self.ledger.get_query_result(query).await.map_err(access)?);

        let mut buffer = String::from("[");
        let mut matches = 0usize;
        while let Some(entry) = cursor.0.next_entry().await.map_err(access)? {
            if matches > 0 {
                buffer.push(',');
            }
            buffer.push_str(r#"{"Key":"#);
            buffer.push_str(&serde_json::to_string(&entry.key)?);
            buffer.push_str(r#","Record":"#);
            buffer.push_str(&String::from_utf8_lossy(&entry.value));
            buffer.push('}');
            matches += 1;
        }
        buffer.push(']');

        debug!(matches, "Query result assembled");
        Ok(buffer)
    }
}
