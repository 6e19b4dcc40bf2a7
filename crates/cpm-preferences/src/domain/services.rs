//! # Domain Services
//!
//! State transitions for a single record, shared by the single-record and
//! batch paths. No I/O: callers load the existing record and persist the
//! result.

use crate::domain::authorization::authorize_mutation;
use crate::domain::entities::{Preference, PreferenceSubmission};
use crate::domain::value_objects::OrgId;
use crate::errors::ContractError;

/// Which path a `set` took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetKind {
    /// No record existed for the phone.
    Created,
    /// An owned record was replaced.
    Updated,
}

/// Record to persist and the path that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetPlan {
    pub record: Preference,
    pub kind: SetKind,
}

/// Decide the outcome of a `set` given what is currently stored.
///
/// Creation needs no ownership check; replacement requires the caller to own
/// the stored record.
///
/// # Errors
///
/// [`ContractError::Unauthorized`] on the replacement path when the caller is
/// not the owner.
pub fn plan_set(
    existing: Option<&Preference>,
    submission: PreferenceSubmission,
    caller: &OrgId,
) -> Result<SetPlan, ContractError> {
    match existing {
        None => Ok(SetPlan {
            record: Preference::create(submission, caller),
            kind: SetKind::Created,
        }),
        Some(current) => {
            authorize_mutation(caller, current)?;
            Ok(SetPlan {
                record: current.replaced_by(submission, caller),
                kind: SetKind::Updated,
            })
        }
    }
}

/// Decide the outcome of a port-out on an existing record.
///
/// # Errors
///
/// [`ContractError::Unauthorized`] when the caller is not the owner.
pub fn plan_port_out(
    current: &Preference,
    service_provider: &str,
    update_ts: &str,
    caller: &OrgId,
) -> Result<Preference, ContractError> {
    authorize_mutation(caller, current)?;
    Ok(current.ported_out(service_provider, update_ts, caller))
}
