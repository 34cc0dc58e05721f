//! `inventory` command-line front end.
//!
//! Opens the configured SQLite database, applies pending migrations and
//! prints the requested view as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use serde::Serialize;
use thiserror::Error;

use pushkind_inventory::db::establish_connection_pool_with_size;
use pushkind_inventory::forms::intake::ExtractedItemForm;
use pushkind_inventory::hierarchy::Outline;
use pushkind_inventory::models::config::InventoryConfig;
use pushkind_inventory::repository::{DieselRepository, ItemListQuery};
use pushkind_inventory::services::{
    ServiceError, categories, intake, items, locations, rooms,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[derive(Parser)]
#[command(name = "inventory")]
#[command(about = "Household inventory of rooms, locations and items")]
#[command(version)]
struct Cli {
    /// SQLite database file; overrides the configured `database_url`.
    #[arg(long)]
    database_url: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every room
    Rooms,
    /// Print the location forest as an outline with effective rooms
    Locations,
    /// Print the category forest as an outline
    Categories,
    /// Print one room with its locations and the items kept there
    Room {
        /// Room identifier
        id: i32,
    },
    /// Print items with their location and room names
    Items {
        /// Only items whose name contains this text
        #[arg(long)]
        search: Option<String>,
        /// Only items without a location
        #[arg(long)]
        unplaced: bool,
    },
    /// Create items from a CSV file with `name,quantity,room,location` columns
    Intake {
        /// CSV file to read
        file: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("failed to open database: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("failed to apply migrations: {0}")]
    Migration(String),
    #[error("failed to read intake file: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to render output: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_intake_file(path: &PathBuf) -> Result<Vec<ExtractedItemForm>, CliError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<ExtractedItemForm>, _>>()?;
    Ok(rows)
}

fn run(cli: Cli, config: InventoryConfig) -> Result<(), CliError> {
    let database_url = cli
        .database_url
        .map(|path| path.to_string_lossy().into_owned())
        .unwrap_or(config.database_url);

    let pool = establish_connection_pool_with_size(&database_url, config.pool_size)?;
    {
        let mut conn = pool.get()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| CliError::Migration(e.to_string()))?;
        if !applied.is_empty() {
            log::info!("Applied {} migration(s) to {database_url}", applied.len());
        }
    }
    let repo = DieselRepository::new(pool);

    match cli.command {
        Commands::Rooms => print_json(&rooms::list_rooms(&repo)?),
        Commands::Locations => print_json(&Outline(&locations::location_forest(&repo)?)),
        Commands::Categories => print_json(&Outline(&categories::category_forest(&repo)?)),
        Commands::Room { id } => print_json(&rooms::room_inventory(id, &repo)?),
        Commands::Items { search, unplaced } => {
            let mut query = ItemListQuery::default();
            if let Some(search) = search {
                query = query.search(search);
            }
            if unplaced {
                query = query.unplaced();
            }
            print_json(&items::list_items(query, &repo)?)
        }
        Commands::Intake { file } => {
            let rows = read_intake_file(&file)?;
            log::info!("Read {} row(s) from {}", rows.len(), file.display());
            print_json(&intake::ingest_extracted_items(rows, &repo)?)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match InventoryConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", CliError::from(e));
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
