//! # Adapters Layer (Outer Hexagon)
//!
//! In-process implementations of the outbound ports, used by the runtime
//! binary and the test suites. A peer deployment would bind the same ports
//! to the ledger shim instead.

pub mod event_sink;
pub mod identity;
pub mod state_adapter;

pub use event_sink::*;
pub use identity::*;
pub use state_adapter::*;
