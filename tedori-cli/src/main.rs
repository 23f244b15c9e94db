use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use tedori_cli::app::{self, EstimateForm};
use tedori_cli::logging::init_logging;
use tedori_cli::render::{self, OutputFormat};
use tedori_data::InputLoader;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Take-home pay breakdown for a Japanese salaried employee.
///
/// Splits an annual salary into income tax, resident tax, social insurance,
/// consumption tax, rent, savings and remaining consumption.
#[derive(Debug, Parser)]
#[command(name = "tedori", version)]
struct Cli {
    /// Tax-year config (TOML). Defaults to the built-in reference year.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bracket tables (CSV) replacing those of the config.
    #[arg(long, global = true)]
    brackets: Option<PathBuf>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Break down one salary.
    Estimate {
        /// Annual gross salary in yen, e.g. `5,000,000`.
        #[arg(long)]
        income: String,

        /// Annual rent in yen.
        #[arg(long, default_value = "0")]
        rent: String,

        /// Annual savings in yen.
        #[arg(long, default_value = "0")]
        savings: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Estimate every row of a CSV file with `income,rent,savings` columns.
    Batch {
        #[arg(long)]
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print the active rates and bracket tables.
    Brackets,
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let estimator = app::build_estimator(cli.config.as_deref(), cli.brackets.as_deref())?;
    let stdout = io::stdout().lock();

    match cli.command {
        Command::Estimate {
            income,
            rent,
            savings,
            format,
        } => {
            let input = EstimateForm::new(income, rent, savings).validate()?;
            let estimate = estimator.estimate(&input);
            info!(grand_total = %estimate.grand_total, "estimate complete");
            render::write_estimate(stdout, &estimate, format)?;
        }
        Command::Batch { file, format } => {
            let inputs = InputLoader::load_from_file(&file)
                .with_context(|| format!("Failed to load inputs: {}", file.display()))?;
            debug!(count = inputs.len(), "loaded batch inputs");
            let estimates: Vec<_> = inputs
                .iter()
                .map(|input| estimator.estimate(input))
                .collect();
            info!(count = estimates.len(), "batch complete");
            render::write_batch(stdout, &estimates, format)?;
        }
        Command::Brackets => {
            print!("{}", render::render_config(estimator.config()));
        }
    }

    Ok(())
}
