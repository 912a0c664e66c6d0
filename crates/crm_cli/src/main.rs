//! Report probe for the CRM core.
//!
//! # Responsibility
//! - Load config, start logging, open the slot database and hydrate a store.
//! - Print the dashboard and pipeline numbers the home/report views show.
//!
//! Usage: `crm_cli [config.toml]` (default `crm.toml`; missing file = defaults).

use crm_core::db::open_db;
use crm_core::{
    format_amount, init_logging, CrmConfig, CrmStore, LoadOrigin, SqliteSlotStore, Stage,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

const DEFAULT_CONFIG_PATH: &str = "crm.toml";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("crm_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = CrmConfig::load(&config_path)?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let conn = open_db(&config.db_path)?;
    let slots = SqliteSlotStore::try_new(&conn)?;
    let store = CrmStore::hydrate(slots, config.seed_policy());

    println!("crm_core version={}", crm_core::core_version());
    println!("db_path={}", config.db_path.display());
    for (slot, origin) in store.hydration_report() {
        let source = match origin {
            LoadOrigin::Stored => "stored".to_string(),
            LoadOrigin::Missing => "default (missing)".to_string(),
            LoadOrigin::Empty => "default (empty)".to_string(),
            LoadOrigin::Recovered(err) => format!("default (recovered: {err})"),
        };
        println!("slot {slot}: {source}");
    }

    let summary = store.dashboard();
    println!();
    println!("Orders total      {}", format_amount(summary.order_total));
    println!("Open deals        {}", summary.open_deals);
    println!("New deals         {}", summary.new_deals);
    println!("Clients           {}", summary.client_count);
    println!("Pipeline value    {}", format_amount(summary.funnel_total));

    println!();
    let funnel = store.aggregate_funnel();
    for stage in Stage::ALL {
        let total = funnel.get(&stage).copied().unwrap_or(0);
        println!(
            "{:<10} {:>3} deals  {}",
            stage.label(),
            store.deals_in_stage(stage).len(),
            format_amount(total)
        );
    }

    let orphans = store.orphaned_references();
    if !orphans.is_empty() {
        println!();
        println!("{} records reference deleted clients", orphans.len());
    }

    info!(
        "event=cli_report module=cli status=ok deals={} orphans={}",
        summary.deal_count,
        orphans.len()
    );

    Ok(())
}
