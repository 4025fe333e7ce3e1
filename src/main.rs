use clap::{Parser, Subcommand};
use lograke::cli::generate::GenerateArgs;
use lograke::cli::query::QueryArgs;
use lograke::config::{load_config, resolve_config_path, Config};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lograke")]
#[command(about = "Query and aggregate day-partitioned CSV log files", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate log rows by time window and dimensions
    Query(QueryArgs),
    /// Generate synthetic CSV log files
    Generate(GenerateArgs),
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter config file
    Init {
        #[arg(long)]
        stdout: bool,
    },
    /// Check that a config file parses and validates
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lograke=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());

    match cli.command {
        Commands::Query(args) => {
            let config = load_or_default(config_path.as_deref())?;
            lograke::cli::query::run(args, config).await?;
        }
        Commands::Generate(args) => {
            let config = load_or_default(config_path.as_deref())?;
            lograke::cli::generate::run(args, config).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { stdout } => {
                lograke::cli::config::init(stdout)?;
            }
            ConfigAction::Validate => {
                lograke::cli::config::validate(config_path)?;
            }
        },
    }

    Ok(())
}

/// Absent config file means built-in defaults; a present but broken one is
/// an error.
fn load_or_default(path: Option<&std::path::Path>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(Config::default()),
    }
}
