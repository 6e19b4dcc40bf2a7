//! # Authorization Gate
//!
//! Owner-only mutation rights. There are no roles and no partial grants:
//! either the caller's organization is the recorded `uby`, or the mutation
//! is refused.

use crate::domain::entities::Preference;
use crate::domain::value_objects::OrgId;
use crate::errors::{ContractError, IdentityError};

/// Pick the caller's organization from the certificate issuer entries.
///
/// The first entry wins.
///
/// # Errors
///
/// [`IdentityError::NoOrganization`] when the issuer lists none.
pub fn organization_from_issuer(organizations: &[String]) -> Result<OrgId, IdentityError> {
    organizations
        .first()
        .map(|org| OrgId::new(org.clone()))
        .ok_or(IdentityError::NoOrganization)
}

/// Check that `caller` may mutate `existing`.
///
/// # Errors
///
/// [`ContractError::Unauthorized`] when the caller is not the recorded owner.
pub fn authorize_mutation(caller: &OrgId, existing: &Preference) -> Result<(), ContractError> {
    if caller.owns(&existing.updated_by) {
        Ok(())
    } else {
        Err(ContractError::Unauthorized {
            phone: existing.phone.clone(),
            caller: caller.to_string(),
            owner: existing.updated_by.clone(),
        })
    }
}
