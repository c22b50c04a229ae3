mod db;
mod sync;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "atelier-cli")]
#[command(about = "Atelier catalog sync command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replace the product catalog with the current spreadsheet contents
    Sync {
        /// Read and normalize the sheet without writing to the store
        #[arg(long)]
        dry_run: bool,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Print the current catalog
    Products {
        /// Only show products from this brand
        #[arg(long)]
        brand: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations (Postgres only)
    Migrate,
    /// Check the configured product store is reachable
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = atelier_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Sync { dry_run: false }) {
        Commands::Sync { dry_run } => sync::run_sync(&config, dry_run).await,
        Commands::Db {
            command: DbCommands::Migrate,
        } => db::run_migrate(&config).await,
        Commands::Db {
            command: DbCommands::Ping,
        } => db::run_ping(&config).await,
        Commands::Products { brand } => db::run_list_products(&config, brand.as_deref()).await,
    }
}
