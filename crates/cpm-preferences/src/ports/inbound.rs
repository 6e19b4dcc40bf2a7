//! # Driving Ports (API - Inbound)
//!
//! The surface the ledger peer drives: one [`Invocation`] per transaction
//! proposal, answered with a [`Response`].

use crate::domain::authorization::organization_from_issuer;
use crate::domain::value_objects::{OrgId, TxId};
use crate::errors::ContractError;
use crate::ports::outbound::IdentityResolver;
use async_trait::async_trait;
use std::borrow::Cow;
use std::fmt;
use tracing::{field, info_span, Span};

// =============================================================================
// OPERATIONS
// =============================================================================

/// Operations the contract answers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `sp`: create or replace one record.
    Set,
    /// `abp`: create or replace many records.
    Batch,
    /// `dp`: churn a record out.
    Delete,
    /// `po`: move a record to a new service provider.
    PortOut,
    /// `qp`: rich query.
    Query,
}

impl Operation {
    /// Every operation, in the order they are advertised.
    pub const ALL: [Operation; 5] = [
        Self::Set,
        Self::Batch,
        Self::Delete,
        Self::PortOut,
        Self::Query,
    ];

    /// Look up an operation by its invocation name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == name)
    }

    /// Invocation name.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Set => "sp",
            Self::Batch => "abp",
            Self::Delete => "dp",
            Self::PortOut => "po",
            Self::Query => "qp",
        }
    }

    /// Handler label used as the prefix of response texts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Set => "setPreferences",
            Self::Batch => "batchPreferences",
            Self::Delete => "delPreferences",
            Self::PortOut => "portOut",
            Self::Query => "queryPreferences",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// INVOCATION
// =============================================================================

/// Function name plus positional string arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub function: String,
    pub args: Vec<String>,
}

impl Invocation {
    #[must_use]
    pub fn new(function: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            function: function.into(),
            args,
        }
    }

    /// Split a peer-style argument list, where the first entry names the
    /// function. `None` for an empty list.
    #[must_use]
    pub fn from_args(mut args: Vec<String>) -> Option<Self> {
        if args.is_empty() {
            return None;
        }
        let function = args.remove(0);
        Some(Self { function, args })
    }
}

/// Per-invocation context handed in by the peer.
///
/// Carries the transaction id, the caller's credential and the logging span
/// every handler runs inside. Nothing in it outlives the invocation.
pub struct InvocationContext<'a> {
    tx_id: TxId,
    identity: &'a dyn IdentityResolver,
    span: Span,
}

impl<'a> InvocationContext<'a> {
    /// Context for one invocation. Opens an `invoke` span tagged with the
    /// transaction id; the function name is recorded once it is known.
    #[must_use]
    pub fn new(tx_id: TxId, identity: &'a dyn IdentityResolver) -> Self {
        let span = info_span!("invoke", tx_id = %tx_id, function = field::Empty);
        Self {
            tx_id,
            identity,
            span,
        }
    }

    #[must_use]
    pub fn tx_id(&self) -> &TxId {
        &self.tx_id
    }

    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Resolve the caller's organization.
    ///
    /// Consults the identity resolver on every call; handlers call it at
    /// most once per invocation.
    ///
    /// # Errors
    ///
    /// [`ContractError::Identity`] when the credential cannot be read or
    /// names no organization.
    pub fn caller_organization(&self) -> Result<OrgId, ContractError> {
        let organizations = self.identity.issuer_organizations()?;
        Ok(organization_from_issuer(&organizations)?)
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Outcome returned to the peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    /// [`Response::OK`] or [`Response::ERROR`].
    pub status: i32,
    /// Error text; empty on success.
    pub message: String,
    /// Success body.
    pub payload: Vec<u8>,
}

impl Response {
    /// Status of a successful invocation.
    pub const OK: i32 = 200;
    /// Status of a failed invocation.
    pub const ERROR: i32 = 500;

    #[must_use]
    pub fn success(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Self::OK,
            message: String::new(),
            payload: payload.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Self::ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == Self::OK
    }

    /// Payload as text.
    #[must_use]
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

// =============================================================================
// API
// =============================================================================

/// Primary API of the preference contract.
#[async_trait]
pub trait PreferenceApi: Send + Sync {
    /// Instantiate or upgrade the contract. Touches no state.
    async fn init(&self, ctx: &InvocationContext<'_>) -> Response;

    /// Route one invocation to its handler.
    async fn invoke(&self, ctx: &InvocationContext<'_>, invocation: Invocation) -> Response;
}
