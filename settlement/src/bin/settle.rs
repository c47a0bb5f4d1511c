//! Settlement calculator binary
//!
//! Reads participants and expenses from a JSON file, prints the settlement
//! result as JSON and optionally appends it to the snapshot store.
//!
//! ```text
//! settle input.json
//! SETTLE_CONFIG=settle.toml settle input.json
//! ```

use anyhow::{bail, Context};
use serde::Deserialize;
use settle_engine::{
    verify_transfers, Config, Expense, FileSnapshotStore, Participant, RemainderOverride,
    SettlementEngine, SettlementId, SnapshotStore,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Calculation request read from disk
#[derive(Debug, Deserialize)]
struct CalculationInput {
    #[serde(default)]
    settlement_id: Option<SettlementId>,
    participants: Vec<Participant>,
    expenses: Vec<Expense>,
    #[serde(default)]
    remainder: Option<RemainderOverride>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = if let Ok(config_path) = std::env::var("SETTLE_CONFIG") {
        info!("Loading config from: {}", config_path);
        Config::from_file(&config_path)
            .with_context(|| format!("failed to load config {}", config_path))?
    } else {
        Config::from_env().context("invalid environment configuration")?
    };

    let Some(input_path) = std::env::args().nth(1) else {
        bail!("usage: settle <input.json>");
    };

    let raw = std::fs::read_to_string(&input_path)
        .with_context(|| format!("failed to read {}", input_path))?;
    let input: CalculationInput = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", input_path))?;

    let engine = SettlementEngine::from_config(&config);
    let settlement_id = input.settlement_id.unwrap_or_default();
    let result = engine.calculate(
        settlement_id,
        &input.expenses,
        &input.participants,
        input.remainder.as_ref(),
    )?;

    if !verify_transfers(&result.participants, &result.transfers) {
        warn!(%settlement_id, "Transfers do not settle every balance");
    }

    if config.snapshot.enabled {
        let store = FileSnapshotStore::open(&config.snapshot.data_dir).with_context(|| {
            format!(
                "failed to open snapshot dir {}",
                config.snapshot.data_dir.display()
            )
        })?;
        store.save(&result)?;
    }

    let output = if config.output.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);

    Ok(())
}
