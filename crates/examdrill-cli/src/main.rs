//! examdrill CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examdrill", version, about = "Question-bank quiz drill harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drill a bank interactively
    Run {
        /// Path to the bank .toml (defaults to the configured bank)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Path to the answer-store JSON file
        #[arg(long)]
        store: Option<PathBuf>,

        /// Keep answers in memory only; nothing is written to disk
        #[arg(long)]
        ephemeral: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a persisted answer store against a bank
    Grade {
        /// Path to the bank .toml
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Path to the answer-store JSON file
        #[arg(long)]
        store: Option<PathBuf>,

        /// Directory to save the session report into
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate bank TOML files
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Create starter config and example bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examdrill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            bank,
            store,
            ephemeral,
            config,
        } => commands::run::execute(bank, store, ephemeral, config).await,
        Commands::Grade {
            bank,
            store,
            output,
            format,
            config,
        } => commands::grade::execute(bank, store, output, format, config).await,
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
