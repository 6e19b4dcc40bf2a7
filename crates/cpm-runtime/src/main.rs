//! # CPM Runtime
//!
//! Runs the preference contract locally against an in-memory ledger.
//!
//! ```text
//! echo '{"Args":["dp","9876543210"]}' | CPM_CALLER_ORG=Org1MSP cpm-runtime
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (stderr)
//! 2. Load configuration from env
//! 3. Instantiate the contract
//! 4. Process stdin until EOF

use anyhow::{bail, Context, Result};
use cpm_runtime::{load_config, ContractRuntime};
use cpm_telemetry::{init_telemetry, log_event, TelemetryConfig};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(&TelemetryConfig::from_env()).context("initializing telemetry")?;

    let config = load_config();
    log_event!(
        info,
        "runtime",
        "Starting preference contract runtime",
        channel = %config.channel,
        caller = %config.caller_orgs,
        min_msisdn_length = config.contract.min_msisdn_length
    );

    let mut runtime = ContractRuntime::new(config);
    let init = runtime.instantiate().await;
    if !init.is_ok() {
        bail!("contract init failed: {}", init.message);
    }

    let summary = runtime
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    log_event!(
        info,
        "runtime",
        "Input exhausted",
        invocations = summary.invocations,
        failures = summary.failures,
        rejected = summary.rejected
    );
    Ok(())
}
