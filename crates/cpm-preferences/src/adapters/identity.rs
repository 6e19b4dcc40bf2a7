//! # Identity Adapter
//!
//! Fixed caller identity, standing in for certificate inspection.

use crate::errors::IdentityError;
use crate::ports::outbound::IdentityResolver;

/// Caller credential with a fixed issuer organization list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    /// `None` models an invocation with no certificate attached.
    organizations: Option<Vec<String>>,
}

impl StaticIdentity {
    /// Credential whose issuer lists `organizations` in order.
    #[must_use]
    pub fn new(organizations: Vec<String>) -> Self {
        Self {
            organizations: Some(organizations),
        }
    }

    /// Credential issued by a single organization.
    #[must_use]
    pub fn single(organization: impl Into<String>) -> Self {
        Self::new(vec![organization.into()])
    }

    /// Parse a comma-separated organization list. Blank entries are dropped.
    #[must_use]
    pub fn from_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|org| !org.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// No certificate at all.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            organizations: None,
        }
    }
}

impl IdentityResolver for StaticIdentity {
    fn issuer_organizations(&self) -> Result<Vec<String>, IdentityError> {
        self.organizations
            .clone()
            .ok_or(IdentityError::MissingCertificate)
    }
}
