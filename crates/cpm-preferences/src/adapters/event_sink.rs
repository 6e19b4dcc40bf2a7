//! # Event Sink Adapter
//!
//! Records emitted events and fans them out to subscribers over a
//! `tokio::sync::broadcast` channel.
//!
//! The broadcast channel is bounded and lagging subscribers lose events.
//! Consumers that need every event drain the history with
//! [`InMemoryEventSink::take_events`].

use crate::errors::EventError;
use crate::events::EmittedEvent;
use crate::ports::outbound::EventSink;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// In-memory event sink.
pub struct InMemoryEventSink {
    /// Every accepted event, in emission order.
    history: RwLock<Vec<EmittedEvent>>,
    /// Live fan-out to subscribers.
    sender: broadcast::Sender<EmittedEvent>,
    /// Refuse every emission while set.
    failing: AtomicBool,
    /// Emissions still accepted while the budget is armed.
    budget: AtomicUsize,
    budget_armed: AtomicBool,
}

impl InMemoryEventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            history: RwLock::new(Vec::new()),
            sender,
            failing: AtomicBool::new(false),
            budget: AtomicUsize::new(0),
            budget_armed: AtomicBool::new(false),
        }
    }

    /// Receive events emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EmittedEvent> {
        self.sender.subscribe()
    }

    /// Snapshot of every event accepted so far.
    #[must_use]
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Move the recorded history out, leaving it empty.
    #[must_use]
    pub fn take_events(&self) -> Vec<EmittedEvent> {
        std::mem::take(&mut *self.history.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// Names of accepted events, in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.name).collect()
    }

    /// Make subsequent emissions fail.
    pub fn fail_emission(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Accept `emissions` more events, then refuse every one after them.
    pub fn fail_emission_after(&self, emissions: usize) {
        self.budget.store(emissions, Ordering::SeqCst);
        self.budget_armed.store(true, Ordering::SeqCst);
    }

    fn take_emission(&self) -> bool {
        if !self.budget_armed.load(Ordering::SeqCst) {
            return true;
        }
        self.budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }

    /// Drop the recorded history.
    pub fn clear(&self) {
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for InMemoryEventSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn set_event(&self, name: &str, payload: Vec<u8>) -> Result<(), EventError> {
        if name.is_empty() {
            return Err(EventError::EmptyName);
        }
        if self.failing.load(Ordering::SeqCst) || !self.take_emission() {
            return Err(EventError::Rejected("sink is not accepting events".into()));
        }

        let event = EmittedEvent {
            name: name.to_string(),
            payload,
        };
        self.history
            .write()
            .map_err(|_| EventError::Rejected("event history lock poisoned".into()))?
            .push(event.clone());

        // No subscribers is fine; the history still has it.
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(event = name, receivers, "Event recorded");
        Ok(())
    }
}
