use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use kursbot::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a rate, or convert an amount, for a date
    Rate {
        /// Currency pair, e.g. EUR/USD
        pair: String,
        /// Date: 01.02.2020, 2020-02-01, "yesterday", "2 days ago"
        date: String,
        /// Amount to convert at the resolved rate
        #[arg(short, long)]
        amount: Option<String>,
    },
    /// List the supported currency pairs
    Pairs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Rate { pair, date, amount }) => {
            kursbot::run_rate(
                &pair,
                &date,
                amount.as_deref(),
                cli.config_path.as_deref(),
            )
            .await
        }
        Some(Commands::Pairs) => {
            kursbot::run_pairs();
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
