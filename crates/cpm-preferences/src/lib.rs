//! # CPM Preferences - Subscriber Preference Contract
//!
//! Ledger contract keeping one preference record per subscriber number
//! (msisdn). Service providers create, replace, churn out and port out the
//! records they own, ingest them in bulk, and run rich queries over them.
//!
//! ## Operations
//!
//! | Function | Args | Behavior |
//! |----------|------|----------|
//! | `sp` | 1 JSON record (11 keys) | create or replace |
//! | `abp` | 1+ JSON records | bulk create or replace, per-item error report |
//! | `dp` | msisdn | churn out |
//! | `po` | msisdn, service provider, update timestamp | port out |
//! | `qp` | selector | rich query, JSON array |
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One record per msisdn | `store.rs` - keyed by `phone` |
//! | Owner-only mutation | `domain/authorization.rs` - `authorize_mutation()` |
//! | Owner set from identity, never input | `domain/entities.rs` - `Preference::create()` |
//! | Create timestamp survives updates and port-outs | `domain/entities.rs` - `replaced_by()`, `ported_out()` |
//! | Format checks precede any write | `domain/validation.rs` - `RecordValidator::validate()` |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | World state | `WorldState` | get / put / delete by key |
//! | Query engine | `RichQuery` | selector queries with closable cursors |
//! | Certificate | `IdentityResolver` | caller's issuer organizations |
//! | Transaction | `EventSink` | mutation notifications |
//!
//! ## Usage Example
//!
//! ```ignore
//! use cpm_preferences::prelude::*;
//!
//! let (contract, _ledger, _events) = create_in_memory_contract(ContractConfig::default());
//! let identity = StaticIdentity::single("OrgA");
//! let ctx = InvocationContext::new(TxId::new("tx-1"), &identity);
//!
//! let resp = contract.invoke(&ctx, Invocation::new("dp", vec!["9876543210".into()])).await;
//! assert!(resp.is_ok());
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod batch;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod publisher;
pub mod query;
pub mod service;
pub mod store;


// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::entities::{Preference, PreferenceSubmission, REQUIRED_FIELDS};
    pub use crate::domain::validation::{RecordValidator, DEFAULT_MIN_MSISDN_LENGTH};
    pub use crate::domain::value_objects::{OrgId, TxId};

    // Ports
    pub use crate::ports::inbound::{
        Invocation, InvocationContext, Operation, PreferenceApi, Response,
    };
    pub use crate::ports::outbound::{
        EventSink, IdentityResolver, KeyValue, RichQuery, StateQueryIterator, WorldState,
    };

    // Events
    pub use crate::events::{topics, BatchItemError, EmittedEvent, EventPayload, PreferenceEvent};

    // Errors
    pub use crate::errors::{ContractError, EventError, FormatViolation, IdentityError, LedgerError};

    // Components
    pub use crate::batch::{BatchProcessor, BatchReport};
    pub use crate::publisher::EventPublisher;
    pub use crate::query::QueryGateway;
    pub use crate::store::PreferenceStore;

    // Adapters
    pub use crate::adapters::{InMemoryEventSink, InMemoryLedger, StaticIdentity};

    // Service
    pub use crate::config::ContractConfig;
    pub use crate::service::{create_in_memory_contract, PreferenceContract};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Contract name as deployed on the channel.
pub const CONTRACT_NAME: &str = "cpm-preferences";
