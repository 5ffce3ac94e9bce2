#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use checkvis_config::Config;
use clap::{Parser, Subcommand};
use command::{
    CommandStrategy, InitStrategy, LookupInput, LookupStrategy, RunStrategy, VersionStrategy,
};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod command;

#[derive(Parser)]
#[command(name = "checkvis")]
#[command(about = "Telegram bot reporting DVZ visa case status", long_about = None)]
struct Cli {
    /// Config file (default: checkvis.json next to the executable)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Run,
    /// Look up one case number and print the result
    Lookup {
        /// Digit-only case number
        case_number: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a config template
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run => {
            let config = Config::load(cli.config.as_deref())?;
            RunStrategy.execute(config).await?;
        }
        Commands::Lookup { case_number, json } => {
            let config = Config::load(cli.config.as_deref())?;
            LookupStrategy
                .execute(LookupInput {
                    config,
                    case_number,
                    json,
                })
                .await?;
        }
        Commands::Init => {
            let path = match cli.config {
                Some(path) => path,
                None => Config::default_path()?,
            };
            InitStrategy.execute(path).await?;
        }
        Commands::Version => {
            VersionStrategy.execute(()).await?;
        }
    }

    Ok(())
}
