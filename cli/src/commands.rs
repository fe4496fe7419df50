//! Subcommands of the `exrate` binary.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Subcommand;
use exrate_feed::{latest_rate_file, load_feed};
use exrate_fx::{ConversionQuery, ImportSummary, RateService, RatesSettings};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import a rate file and print the import summary
    Import {
        /// JSON import document or fixed-width settlement rate file
        file: PathBuf,
    },

    /// Import a rate file and print the resulting rates
    Rates {
        /// JSON import document or fixed-width settlement rate file
        file: PathBuf,
    },

    /// Import a rate file and convert an amount
    Convert {
        /// JSON import document or fixed-width settlement rate file
        file: PathBuf,

        /// Amount to convert
        #[arg(long, allow_negative_numbers = true)]
        amount: Decimal,

        /// Source currency, alphabetic or numeric code
        #[arg(long)]
        from: String,

        /// Target currency, alphabetic or numeric code
        #[arg(long)]
        to: String,

        /// BUY or SELL
        #[arg(long)]
        side: String,

        /// Margin percentage applied when the source is not the base currency
        #[arg(long, default_value = "0")]
        base_margin: Decimal,

        /// Margin percentage applied when the target is not the base currency
        #[arg(long, default_value = "0")]
        target_margin: Decimal,

        /// Flip the sign of both margins
        #[arg(long)]
        inverse_margin: bool,
    },

    /// Print the newest settlement rate file in a directory
    Latest {
        /// Directory holding `.sw0` rate files
        dir: PathBuf,
    },
}

/// Run a command and return its JSON output.
pub async fn run(command: Command, settings: RatesSettings) -> anyhow::Result<Value> {
    match command {
        Command::Import { file } => {
            let (_, summary) = import_file(&file, settings).await?;
            Ok(serde_json::to_value(summary)?)
        }
        Command::Rates { file } => {
            let (service, _) = import_file(&file, settings).await?;
            Ok(serde_json::to_value(service.get_all_rates().await?)?)
        }
        Command::Convert {
            file,
            amount,
            from,
            to,
            side,
            base_margin,
            target_margin,
            inverse_margin,
        } => {
            let (service, _) = import_file(&file, settings).await?;
            let result = service
                .convert(ConversionQuery {
                    amount,
                    source_currency: from,
                    target_currency: to,
                    rate_side: side,
                    base_margin_percent: Some(base_margin),
                    target_margin_percent: Some(target_margin),
                    inverse_margin: Some(inverse_margin),
                })
                .await?;
            Ok(serde_json::to_value(result)?)
        }
        Command::Latest { dir } => match latest_rate_file(&dir)? {
            Some(path) => Ok(json!({ "file": path })),
            None => bail!("No rate file found in {}", dir.display()),
        },
    }
}

async fn import_file(
    file: &Path,
    settings: RatesSettings,
) -> anyhow::Result<(RateService, ImportSummary)> {
    let feed = load_feed(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let service = RateService::in_memory(settings)?;
    let summary = service.import_rates(&feed).await?;

    info!(
        file = %file.display(),
        import_id = %summary.import_id,
        records = summary.records,
        "Rate file loaded"
    );

    Ok((service, summary))
}
