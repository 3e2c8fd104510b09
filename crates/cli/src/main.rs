use anyhow::Context;

use splitledger_infra::{build_dashboard, load_snapshot};
use splitledger_observability::ObservabilityConfig;

mod config;

use crate::config::{CliConfig, Report};

fn main() -> anyhow::Result<()> {
    splitledger_observability::init(&ObservabilityConfig::from_env());

    let config = CliConfig::from_args_and_env(std::env::args().skip(1), |key| std::env::var(key).ok())?;
    tracing::info!(snapshot = %config.snapshot_path.display(), report = ?config.report, "starting");

    let snapshot = load_snapshot(&config.snapshot_path)?;
    let dashboard = build_dashboard(&snapshot).context("failed to compute balances")?;

    let output = match config.report {
        Report::Dashboard => serde_json::to_string_pretty(&dashboard)?,
        Report::Balances => serde_json::to_string_pretty(&dashboard.balances)?,
        Report::Plan => serde_json::to_string_pretty(&dashboard.transfers)?,
    };
    println!("{output}");

    Ok(())
}
