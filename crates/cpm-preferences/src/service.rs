//! # Preference Contract Service
//!
//! Dispatcher and handlers. One [`PreferenceContract`] serves every
//! invocation; nothing is shared between invocations except the ledger.
//!
//! | Function | Handler | Success text |
//! |----------|---------|--------------|
//! | `sp` | `setPreferences` | added / updated for MSISDN, with TransactionID |
//! | `abp` | `batchPreferences` | clean batch or joined error entries |
//! | `dp` | `delPreferences` | deleted, or no existing preferences |
//! | `po` | `portOut` | PutState success, or no existing preferences |
//! | `qp` | `queryPreferences` | JSON array of `{Key, Record}` |
//!
//! Every handler runs inside the invocation span carried by the
//! [`InvocationContext`].

use crate::adapters::{InMemoryEventSink, InMemoryLedger};
use crate::batch::BatchProcessor;
use crate::config::ContractConfig;
use crate::domain::authorization::authorize_mutation;
use crate::domain::services::{plan_port_out, plan_set, SetKind};
use crate::domain::validation::{parse_record, RecordValidator};
use crate::errors::ContractError;
use crate::events::PreferenceEvent;
use crate::ports::inbound::{Invocation, InvocationContext, Operation, PreferenceApi, Response};
use crate::ports::outbound::{EventSink, RichQuery, WorldState};
use crate::publisher::EventPublisher;
use crate::query::QueryGateway;
use crate::store::PreferenceStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

/// The subscriber preference contract.
pub struct PreferenceContract<L, E>
where
    L: WorldState + RichQuery,
    E: EventSink,
{
    config: ContractConfig,
    validator: RecordValidator,
    store: PreferenceStore<L>,
    publisher: EventPublisher<E>,
    queries: QueryGateway<L>,
}

impl<L, E> PreferenceContract<L, E>
where
    L: WorldState + RichQuery,
    E: EventSink,
{
    /// Bind the contract to a ledger and an event sink.
    pub fn new(ledger: Arc<L>, events: Arc<E>, config: ContractConfig) -> Self {
        Self {
            validator: config.validator(),
            store: PreferenceStore::new(Arc::clone(&ledger)),
            publisher: EventPublisher::new(events),
            queries: QueryGateway::new(ledger),
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    async fn dispatch(
        &self,
        ctx: &InvocationContext<'_>,
        operation: Operation,
        args: &[String],
    ) -> Result<String, ContractError> {
        match operation {
            Operation::Set => self.set_preferences(ctx, args).await,
            Operation::Batch => self.batch_preferences(ctx, args).await,
            Operation::Delete => self.delete_preferences(ctx, args).await,
            Operation::PortOut => self.port_out(ctx, args).await,
            Operation::Query => self.query_preferences(args).await,
        }
    }

    // =========================================================================
    // HANDLERS
    // =========================================================================

    /// `sp`: create or fully replace one record.
    async fn set_preferences(
        &self,
        ctx: &InvocationContext<'_>,
        args: &[String],
    ) -> Result<String, ContractError> {
        let [arg] = args else {
            return Err(ContractError::field_set());
        };
        let submission = self.validator.validate(&parse_record(arg)?)?;
        let caller = ctx.caller_organization()?;

        let existing = self.store.get(&submission.phone).await?;
        let plan = plan_set(existing.as_ref(), submission, &caller)?;

        let encoded = self.store.put(&plan.record).await?;
        self.publisher
            .publish(plan.kind.into(), encoded, ctx.tx_id())
            .await?;

        let phone = &plan.record.phone;
        let tx_id = ctx.tx_id();
        Ok(match plan.kind {
            SetKind::Created => format!(
                "setPreferences : Preferences data added Successfully for MSISDN : {phone} , TransactionID {tx_id}"
            ),
            SetKind::Updated => format!(
                "setPreferences : Preferences data updated Successfully for MSISDN : {phone} , TransactionID {tx_id}"
            ),
        })
    }

    /// `abp`: bulk create or replace.
    async fn batch_preferences(
        &self,
        ctx: &InvocationContext<'_>,
        args: &[String],
    ) -> Result<String, ContractError> {
        let report = BatchProcessor::new(&self.store, &self.publisher, self.validator)
            .process(ctx, args)
            .await?;
        report.render(ctx.tx_id().as_str(), &self.config.batch_error_delimiter)
    }

    /// `dp`: churn out one record. An absent record is not an error.
    async fn delete_preferences(
        &self,
        ctx: &InvocationContext<'_>,
        args: &[String],
    ) -> Result<String, ContractError> {
        let [phone] = args else {
            return Err(ContractError::argument_count("1 [msisdn]"));
        };

        let Some(existing) = self.store.get(phone).await? else {
            info!(phone = %phone, "No existing preferences to delete");
            return Ok(format!(
                "delPreferences : No Existing preferences for MSISDN : {phone}"
            ));
        };

        let caller = ctx.caller_organization()?;
        authorize_mutation(&caller, &existing)?;

        self.store.delete(phone).await?;
        self.publisher
            .publish(PreferenceEvent::Deleted, phone.clone(), ctx.tx_id())
            .await?;

        Ok(format!(
            "delPreferences : Preferences deleted for MSISDN : {phone} , TransactionID : {}",
            ctx.tx_id()
        ))
    }

    /// `po`: move one record to a new service provider.
    async fn port_out(
        &self,
        ctx: &InvocationContext<'_>,
        args: &[String],
    ) -> Result<String, ContractError> {
        let [phone, service_provider, update_ts] = args else {
            return Err(ContractError::argument_count(
                "3 [msisdn,serviceprovider,updatedtime]",
            ));
        };
        self.validator
            .check_msisdn(phone)
            .map_err(ContractError::Format)?;

        let Some(existing) = self.store.get(phone).await? else {
            info!(phone = %phone, "No existing preferences to port out");
            return Ok(format!(
                "portOut : No Existing preferences for MSISDN : {phone}"
            ));
        };

        let caller = ctx.caller_organization()?;
        let ported = plan_port_out(&existing, service_provider, update_ts, &caller)?;

        let encoded = self.store.put(&ported).await?;
        self.publisher
            .publish(PreferenceEvent::PortedOut, encoded, ctx.tx_id())
            .await?;

        Ok(format!(
            "portOut : PutState Success for MSISDN : {phone} , TransactionID : {}",
            ctx.tx_id()
        ))
    }

    /// `qp`: rich query.
    async fn query_preferences(&self, args: &[String]) -> Result<String, ContractError> {
        let [query] = args else {
            return Err(ContractError::argument_count("1 [Query String]"));
        };
        self.queries.execute(query).await
    }
}

#[async_trait]
impl<L, E> PreferenceApi for PreferenceContract<L, E>
where
    L: WorldState + RichQuery,
    E: EventSink,
{
    async fn init(&self, ctx: &InvocationContext<'_>) -> Response {
        ctx.span().in_scope(|| {
            info!(
                contract = crate::CONTRACT_NAME,
                version = crate::VERSION,
                "Preference contract initialized"
            );
        });
        Response::success(Vec::new())
    }

    async fn invoke(&self, ctx: &InvocationContext<'_>, invocation: Invocation) -> Response {
        let span = ctx.span().clone();
        span.record("function", invocation.function.as_str());

        async move {
            let Some(operation) = Operation::parse(&invocation.function) else {
                let err = ContractError::UnknownOperation(invocation.function);
                warn!(error = %err, "Unknown function");
                return Response::error(err.to_string());
            };

            match self.dispatch(ctx, operation, &invocation.args).await {
                Ok(text) => {
                    info!(operation = operation.label(), "Invocation succeeded");
                    Response::success(text)
                }
                Err(err) => {
                    if err.is_item_level() {
                        warn!(operation = operation.label(), error = %err, "Invocation rejected");
                    } else {
                        error!(operation = operation.label(), error = %err, "Invocation failed");
                    }
                    Response::error(err.response_message(operation.label()))
                }
            }
        }
        .instrument(span)
        .await
    }
}

// =============================================================================
// IN-MEMORY WIRING
// =============================================================================

/// In-memory contract with its ledger and event sink, for tests and local runs.
#[must_use]
pub fn create_in_memory_contract(
    config: ContractConfig,
) -> (
    PreferenceContract<InMemoryLedger, InMemoryEventSink>,
    Arc<InMemoryLedger>,
    Arc<InMemoryEventSink>,
) {
    let ledger = Arc::new(InMemoryLedger::new());
    let sink = Arc::new(InMemoryEventSink::new());
    let contract = PreferenceContract::new(Arc::clone(&ledger), Arc::clone(&sink), config);
    (contract, ledger, sink)
}

// =============================================================================
// TESTS
// =============================================================================
