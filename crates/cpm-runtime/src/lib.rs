//! # CPM Runtime
//!
//! Local host for the preference contract.
//!
//! ## Modules
//!
//! - `config/` - Caller identity, channel and contract tunables from env
//! - `wire/` - Peer-style request lines and JSON output lines
//! - `runtime/` - Drives the contract over the in-memory ledger
//!
//! ## Flow
//!
//! ```text
//! stdin ──{"Args":[fn,...]}──→ ContractRuntime ──invoke──→ PreferenceContract
//!                                   │                          │
//!                                   │                   InMemoryLedger
//!                                   │                   InMemoryEventSink ──take_events┐
//!                                   ↓                                                  │
//! stdout ←── response line ─────────┴──────────── event lines ←────────────────────────┘
//! ```

pub mod config;
pub mod runtime;
pub mod wire;

pub use config::{load_config, RuntimeConfig};
pub use runtime::{ContractRuntime, RunSummary};
