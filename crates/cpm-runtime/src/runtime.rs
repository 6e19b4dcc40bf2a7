//! # Contract Runtime
//!
//! Hosts one [`PreferenceContract`] over the in-memory ledger and drives it
//! from a line-oriented request stream. Each line is one transaction with
//! its own id, identity and span; events it emitted are written right after
//! its response. Events are moved out of the sink's history after every
//! line, so no call can lose events and the history never grows past one
//! call's worth.

use crate::config::RuntimeConfig;
use crate::wire::{new_tx_id, OutputLine, PeerRequest};
use anyhow::{Context, Result};
use cpm_preferences::adapters::{InMemoryEventSink, InMemoryLedger, StaticIdentity};
use cpm_preferences::domain::value_objects::TxId;
use cpm_preferences::ports::inbound::{Invocation, InvocationContext, PreferenceApi, Response};
use cpm_preferences::ports::outbound::IdentityResolver;
use cpm_preferences::service::{create_in_memory_contract, PreferenceContract};
use cpm_telemetry::{log_event, log_invocation};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Function name routed to the contract's init entry point.
pub const INIT_FUNCTION: &str = "init";

const COMPONENT: &str = "runtime";

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines that reached the contract.
    pub invocations: usize,
    /// Invocations answered with an error status.
    pub failures: usize,
    /// Lines that could not be decoded.
    pub rejected: usize,
}

/// The local contract host.
pub struct ContractRuntime {
    contract: PreferenceContract<InMemoryLedger, InMemoryEventSink>,
    ledger: Arc<InMemoryLedger>,
    events: Arc<InMemoryEventSink>,
    default_identity: StaticIdentity,
    config: RuntimeConfig,
    line_no: usize,
    summary: RunSummary,
}

impl ContractRuntime {
    /// Create a runtime with an empty ledger.
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        let (contract, ledger, events) = create_in_memory_contract(config.contract.clone());
        Self {
            contract,
            ledger,
            events,
            default_identity: StaticIdentity::new(config.organizations()),
            config,
            line_no: 0,
            summary: RunSummary::default(),
        }
    }

    /// Ledger backing the contract.
    #[must_use]
    pub fn ledger(&self) -> &Arc<InMemoryLedger> {
        &self.ledger
    }

    /// Totals so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Run the contract's init entry point as the default caller.
    pub async fn instantiate(&self) -> Response {
        let identity = self.default_identity.clone();
        let tx_id = new_tx_id(&identity.issuer_organizations().unwrap_or_default());
        let ctx = InvocationContext::new(TxId::new(tx_id), &identity);
        let response = self.contract.init(&ctx).await;
        log_event!(
            info,
            COMPONENT,
            "Contract instantiated",
            channel = %self.config.channel,
            status = response.status
        );
        response
    }

    /// Process one input line and return the lines to write.
    pub async fn handle_line(&mut self, line: &str) -> Vec<OutputLine> {
        self.line_no += 1;
        if line.trim().is_empty() {
            return Vec::new();
        }

        let request = match PeerRequest::parse(line) {
            Ok(request) => request,
            Err(err) => {
                log_event!(warn, COMPONENT, "Rejected input line", line = self.line_no, error = %err);
                self.summary.rejected += 1;
                return vec![OutputLine::Rejected {
                    line: self.line_no,
                    error: err.to_string(),
                }];
            }
        };

        let identity = request
            .identity
            .map_or_else(|| self.default_identity.clone(), StaticIdentity::new);
        let Some(invocation) = Invocation::from_args(request.args) else {
            self.summary.rejected += 1;
            return vec![OutputLine::Rejected {
                line: self.line_no,
                error: "request has an empty Args list".to_string(),
            }];
        };

        let tx_id = new_tx_id(&identity.issuer_organizations().unwrap_or_default());
        let ctx = InvocationContext::new(TxId::new(tx_id.clone()), &identity);
        let function = invocation.function.clone();

        let response = if function == INIT_FUNCTION {
            self.contract.init(&ctx).await
        } else {
            self.contract.invoke(&ctx, invocation).await
        };

        self.summary.invocations += 1;
        if response.is_ok() {
            log_invocation!(debug, COMPONENT, "Invocation complete", tx_id, function);
        } else {
            self.summary.failures += 1;
            log_invocation!(
                info,
                COMPONENT,
                "Invocation returned an error",
                tx_id,
                function,
                error = %response.message
            );
        }

        let mut out = vec![OutputLine::response(&tx_id, &function, &response)];
        out.extend(
            self.events
                .take_events()
                .iter()
                .map(|e| OutputLine::event(&tx_id, e)),
        );
        out
    }

    /// Read requests until EOF, writing one JSON line per output.
    ///
    /// # Errors
    ///
    /// I/O failures on either stream.
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<RunSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await.context("reading request")? {
            for output in self.handle_line(&line).await {
                let mut encoded =
                    serde_json::to_string(&output).context("encoding output line")?;
                encoded.push('\n');
                writer
                    .write_all(encoded.as_bytes())
                    .await
                    .context("writing output line")?;
            }
            writer.flush().await.context("flushing output")?;
        }
        Ok(self.summary)
    }
}
