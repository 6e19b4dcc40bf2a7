//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic for preference records.
//! NO I/O, NO async.
//!
//! - `entities`: the stored [`Preference`] and validated submissions
//! - `validation`: schema and field-format rules
//! - `authorization`: owner-only mutation gate
//! - `services`: `set` and port-out state transitions

pub mod authorization;
pub mod entities;
pub mod services;
pub mod validation;
pub mod value_objects;

pub use authorization::*;
pub use entities::*;
pub use services::*;
pub use validation::*;
pub use value_objects::*;
