use clap::{Parser, Subcommand};
use physio_planner::app::{handle_fatal_error, initialize_app, init_logging};
use physio_planner::config::AppConfig;
use physio_planner::model::Dosage;
use physio_planner::storage::BackendType;
use std::path::PathBuf;
use tracing::debug;

/// Routine calendar and guided exercise sessions for a physiotherapy clinic
#[derive(Parser)]
#[command(name = "physio")]
#[command(about = "Physiotherapy routine planner", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
    /// Load and validate configuration, then print the effective values
    CheckConfig {
        /// Path to configuration file
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
    /// Show how a reps-or-duration text is interpreted
    ParseDosage {
        /// Text such as "10 repeticiones" or "30 segundos"
        text: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = match cli.command {
        Commands::Serve { config } => run_serve(config, verbose).await,
        Commands::CheckConfig { config } => run_check_config(config),
        Commands::ParseDosage { text } => run_parse_dosage(&text),
    };

    if let Err(e) = result {
        handle_fatal_error(e, verbose);
    }
}

async fn run_serve(config: Option<PathBuf>, verbose: u8) -> anyhow::Result<()> {
    let config = AppConfig::load(config.as_deref())?;
    let context = initialize_app(config, verbose).await?;
    physio_planner::api::serve(context).await
}

fn run_check_config(config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = AppConfig::load(config.as_deref())?;
    println!("{}", config.to_toml()?);
    if config.storage.backend == BackendType::File {
        if let Some(path) = config.storage.resolved_path() {
            println!("# file backend location: {}", path.display());
        }
    }
    Ok(())
}

fn run_parse_dosage(text: &str) -> anyhow::Result<()> {
    init_logging(&AppConfig::default(), 0);
    let dosage = Dosage::parse(text)?;
    debug!("Parsed {:?} from {:?}", dosage, text);
    match dosage.duration_seconds() {
        Some(seconds) => println!("timed: {} seconds ({})", seconds, dosage),
        None => println!("repetitions: {}", dosage),
    }
    Ok(())
}
