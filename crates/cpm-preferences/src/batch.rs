//! # Batch Processor
//!
//! Bulk create-or-replace. Each argument is one preference record and runs
//! through the same validate → authorize → persist → publish pipeline as a
//! single `sp`, except that rejected items are recorded and skipped instead
//! of failing the invocation.
//!
//! ## Failure policy
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Wrong field set | one error entry, raw item as `data` |
//! | Bad msisdn / lrn | one error entry, offending value as `data` |
//! | Caller is not the owner | one error entry, raw item as `data` |
//! | Unparseable item, identity, ledger, event | whole batch fails |
//!
//! Items persisted before a hard failure stay in the write-set.

use crate::domain::entities::fields;
use crate::domain::services::plan_set;
use crate::domain::validation::{parse_record, RawRecord, RecordValidator};
use crate::errors::ContractError;
use crate::events::BatchItemError;
use crate::ports::inbound::InvocationContext;
use crate::ports::outbound::{EventSink, WorldState};
use crate::publisher::EventPublisher;
use crate::store::PreferenceStore;
use tracing::{info, warn};

/// Handler label prefixed to batch outcome texts.
pub const BATCH_LABEL: &str = "batchPreferences";

/// Error detail for an item with the wrong field set.
pub const SCHEMA_DETAIL: &str = "Incorrect number of arguments, expected 11 keys";

/// Error detail for an item owned by another organization.
pub const UNAUTHORIZED_DETAIL: &str = "Unauthorized Access";

// =============================================================================
// REPORT
// =============================================================================

/// Structured outcome of a batch that did not hard-fail.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Items examined.
    pub processed: usize,
    /// Items written to world-state.
    pub persisted: usize,
    /// One entry per rejected item, in submission order.
    pub errors: Vec<BatchItemError>,
}

impl BatchReport {
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Render the response text.
    ///
    /// A clean batch reports success with the transaction id; otherwise the
    /// JSON error entries are joined with `delimiter`.
    ///
    /// # Errors
    ///
    /// [`ContractError::Serialization`] if an entry cannot be encoded.
    pub fn render(&self, tx_id: &str, delimiter: &str) -> Result<String, ContractError> {
        if self.is_clean() {
            return Ok(format!(
                "{BATCH_LABEL} : Batch Preferences data added Successfully. TransactionID : {tx_id}"
            ));
        }
        let entries = self
            .errors
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!(
            "{BATCH_LABEL} : Updating batch Error : {}",
            entries.join(delimiter)
        ))
    }
}

// =============================================================================
// PROCESSOR
// =============================================================================

/// Runs a bulk submission against the store and publisher of one contract.
pub struct BatchProcessor<'a, L: WorldState, E: EventSink> {
    store: &'a PreferenceStore<L>,
    publisher: &'a EventPublisher<E>,
    validator: RecordValidator,
}

impl<'a, L: WorldState, E: EventSink> BatchProcessor<'a, L, E> {
    pub fn new(
        store: &'a PreferenceStore<L>,
        publisher: &'a EventPublisher<E>,
        validator: RecordValidator,
    ) -> Self {
        Self {
            store,
            publisher,
            validator,
        }
    }

    /// Process every item in order.
    ///
    /// The caller's organization is resolved once, before the first item.
    ///
    /// # Errors
    ///
    /// [`ContractError::Schema`] for an empty batch; otherwise any
    /// non-item-level error from the pipeline.
    pub async fn process(
        &self,
        ctx: &InvocationContext<'_>,
        items: &[String],
    ) -> Result<BatchReport, ContractError> {
        if items.is_empty() {
            return Err(ContractError::argument_count("at least 1 preference record"));
        }

        let caller = ctx.caller_organization()?;
        info!(items = items.len(), caller = %caller, "Processing batch");

        let mut report = BatchReport::default();
        for (index, item) in items.iter().enumerate() {
            report.processed += 1;
            let record = parse_record(item)?;

            let submission = match self.validator.validate(&record) {
                Ok(submission) => submission,
                Err(err) => {
                    warn!(index, error = %err, "Batch item rejected");
                    report.errors.push(rejection(&err, item, &record));
                    continue;
                }
            };

            let existing = self.store.get(&submission.phone).await?;
            let plan = match plan_set(existing.as_ref(), submission, &caller) {
                Ok(plan) => plan,
                Err(err) if err.is_item_level() => {
                    warn!(index, error = %err, "Batch item rejected");
                    report.errors.push(rejection(&err, item, &record));
                    continue;
                }
                Err(err) => return Err(err),
            };

            let encoded = self.store.put(&plan.record).await?;
            self.publisher
                .publish(plan.kind.into(), encoded, ctx.tx_id())
                .await?;
            report.persisted += 1;
        }

        info!(
            processed = report.processed,
            persisted = report.persisted,
            rejected = report.error_count(),
            "Batch complete"
        );
        Ok(report)
    }
}

/// Error entry for an item-level rejection.
fn rejection(err: &ContractError, item: &str, record: &RawRecord) -> BatchItemError {
    match err {
        ContractError::Format(violation) => {
            let field = if violation.concerns_lrn() {
                fields::LRN
            } else {
                fields::MSISDN
            };
            BatchItemError {
                data: record
                    .get(field)
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or(item)
                    .to_string(),
                error_details: violation.batch_detail().to_string(),
            }
        }
        ContractError::Unauthorized { .. } => BatchItemError {
            data: item.to_string(),
            error_details: UNAUTHORIZED_DETAIL.to_string(),
        },
        _ => BatchItemError {
            data: item.to_string(),
            error_details: SCHEMA_DETAIL.to_string(),
        },
    }
}

// =============================================================================
// TESTS
// =============================================================================
