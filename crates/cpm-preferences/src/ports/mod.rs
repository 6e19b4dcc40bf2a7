//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the preference contract and the ledger peer.
//!
//! - **Driving Ports (Inbound)**: `PreferenceApi`, invoked once per transaction proposal
//! - **Driven Ports (Outbound)**: `WorldState`, `RichQuery`, `IdentityResolver`, `EventSink`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
