//! Loads the ledger config the same way a host process would, builds the
//! ledger, and prints the resulting catalog and refund schedule as JSON.
//!
//! Exits non-zero when the config is missing, malformed or invalid.

use anyhow::Context;

use hotel_ledger::{LedgerConfig, ReservationLedger};

fn main() -> anyhow::Result<()> {
    hotel_observability::init();

    let config = LedgerConfig::from_env().context("loading ledger config")?;
    let ledger = ReservationLedger::from_config(&config).context("building ledger")?;

    let report = serde_json::json!({
        "rooms": ledger.get_rooms(),
        "refund_schedule": ledger.refund_schedule(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!(rooms = ledger.get_rooms().len(), "ledger config ok");
    Ok(())
}
