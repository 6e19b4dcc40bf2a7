//! # State Adapter
//!
//! In-memory world-state with a minimal CouchDB-style selector engine.
//!
//! Keys iterate in lexical order. Selectors support field equality only:
//!
//! ```json
//! {"selector": {"obj": "Preferences", "uby": "OrgA"}}
//! ```
//!
//! Operator clauses (`$gt`, `$regex`, ...) are refused with
//! [`LedgerError::Query`]. Fault switches let tests drive the error paths.

use crate::errors::LedgerError;
use crate::ports::outbound::{KeyValue, RichQuery, StateQueryIterator, WorldState};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// In-memory ledger for tests and the local runtime.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    /// Committed key-value pairs.
    state: RwLock<BTreeMap<String, Vec<u8>>>,
    /// Query cursors handed out and not yet closed.
    open_cursors: Arc<AtomicUsize>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    /// Puts still accepted before `put_state` starts failing, while armed.
    write_budget: AtomicUsize,
    write_budget_armed: AtomicBool,
    fail_queries: AtomicBool,
    fail_query_steps: AtomicBool,
}

impl InMemoryLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes, bypassing the contract.
    ///
    /// # Errors
    ///
    /// [`LedgerError::LockPoisoned`].
    pub fn insert_raw(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.state
            .write()
            .map_err(|_| LedgerError::LockPoisoned)?
            .insert(key.to_string(), value);
        Ok(())
    }

    /// Raw bytes under `key`, bypassing the contract.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored keys in iteration order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Query cursors opened and not yet closed.
    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Make `get_state` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make `put_state` and `del_state` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Accept `writes` more puts, then fail every put after them.
    pub fn fail_writes_after(&self, writes: usize) {
        self.write_budget.store(writes, Ordering::SeqCst);
        self.write_budget_armed.store(true, Ordering::SeqCst);
    }

    /// Spend one put from the write budget. False once it is exhausted.
    fn take_write(&self) -> bool {
        if !self.write_budget_armed.load(Ordering::SeqCst) {
            return true;
        }
        self.write_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }

    /// Make opening a query fail.
    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make cursors fail after yielding their first match.
    pub fn fail_query_steps(&self, fail: bool) {
        self.fail_query_steps.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl WorldState for InMemoryLedger {
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LedgerError::Read(format!("injected failure for {key}")));
        }
        Ok(self
            .state
            .read()
            .map_err(|_| LedgerError::LockPoisoned)?
            .get(key)
            .cloned())
    }

    async fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        if key.is_empty() {
            return Err(LedgerError::Write("key must not be empty".into()));
        }
        if self.fail_writes.load(Ordering::SeqCst) || !self.take_write() {
            return Err(LedgerError::Write(format!("injected failure for {key}")));
        }
        self.insert_raw(key, value)
    }

    async fn del_state(&self, key: &str) -> Result<(), LedgerError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Delete(format!("injected failure for {key}")));
        }
        self.state
            .write()
            .map_err(|_| LedgerError::LockPoisoned)?
            .remove(key);
        Ok(())
    }
}

#[async_trait]
impl RichQuery for InMemoryLedger {
    async fn get_query_result(
        &self,
        query: &str,
    ) -> Result<Box<dyn StateQueryIterator>, LedgerError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable);
        }
        let selector = Selector::parse(query)?;

        let matches: VecDeque<KeyValue> = self
            .state
            .read()
            .map_err(|_| LedgerError::LockPoisoned)?
            .iter()
            .filter(|(_, value)| selector.matches(value))
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryCursor {
            entries: matches,
            yielded: 0,
            fail_after_first: self.fail_query_steps.load(Ordering::SeqCst),
            open_cursors: Arc::clone(&self.open_cursors),
            closed: false,
        }))
    }
}

// =============================================================================
// SELECTOR
// =============================================================================

/// Equality-only selector.
#[derive(Debug)]
struct Selector {
    fields: Map<String, Value>,
}

impl Selector {
    fn parse(query: &str) -> Result<Self, LedgerError> {
        let parsed: Value = serde_json::from_str(query)
            .map_err(|e| LedgerError::Query(format!("query is not valid JSON: {e}")))?;

        let fields = parsed
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| LedgerError::Query("query has no selector object".into()))?;

        for (field, expected) in fields {
            if field.starts_with('$') || expected.is_object() || expected.is_array() {
                return Err(LedgerError::Query(format!(
                    "unsupported selector clause on '{field}'"
                )));
            }
        }

        Ok(Self {
            fields: fields.clone(),
        })
    }

    /// Undecodable or non-object values never match.
    fn matches(&self, stored: &[u8]) -> bool {
        match serde_json::from_slice::<Value>(stored) {
            Ok(Value::Object(record)) => self
                .fields
                .iter()
                .all(|(field, expected)| record.get(field) == Some(expected)),
            _ => false,
        }
    }
}

// =============================================================================
// CURSOR
// =============================================================================

/// Snapshot cursor over the matches of one query.
struct InMemoryCursor {
    entries: VecDeque<KeyValue>,
    yielded: usize,
    fail_after_first: bool,
    open_cursors: Arc<AtomicUsize>,
    closed: bool,
}

#[async_trait]
impl StateQueryIterator for InMemoryCursor {
    async fn next_entry(&mut self) -> Result<Option<KeyValue>, LedgerError> {
        if self.closed {
            return Err(LedgerError::Query("cursor already closed".into()));
        }
        if self.fail_after_first && self.yielded >= 1 {
            return Err(LedgerError::Query("cursor step failed".into()));
        }
        let next = self.entries.pop_front();
        if next.is_some() {
            self.yielded += 1;
        }
        Ok(next)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.open_cursors.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
