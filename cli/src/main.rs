//! exrate CLI
//!
//! Imports a rate file into an in-memory store and answers rate and
//! conversion queries against it. Output is JSON on stdout, logs go to
//! stderr.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exrate_fx::RatesSettings;

mod commands;

use commands::Command;

/// exrate command line
#[derive(Parser, Debug)]
#[command(name = "exrate")]
#[command(about = "Exchange rate import and conversion")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let json_logs = std::env::var_os("EXRATE_LOG_JSON").is_some();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let args = Args::parse();

    // Load configuration
    let settings = RatesSettings::from_env();
    info!(
        base_currency = %settings.base_currency_code,
        initial_load = %settings.initial_load_percentage,
        decimal_places = settings.amount_round_decimal_places,
        "Loaded rate settings"
    );

    let output = match commands::run(args.command, settings).await {
        Ok(output) => output,
        Err(e) => {
            error!(error = %e, "Command failed");
            return Err(e);
        }
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    Ok(())
}
