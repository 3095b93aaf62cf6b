//! shoedist CLI - administer a shoe distribution database

use clap::{Parser, Subcommand};
use serde::Serialize;
use shoedist::config::{self, ShoedistConfig};
use shoedist::output::OutputMode;
use shoedist::storage::SqliteStore;
use shoedist::ui::{self, Icons};
use shoedist::{
    Contract, Dataset, Distributor, Employs, Entity, Makes, Manufacturer, Salesperson, Sells,
    Shoes, Table,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "shoedist")]
#[command(version)]
#[command(about = "Shoe distribution database - manufacturers, distributors, salespeople and shoes")]
#[command(long_about = r#"
shoedist manages a SQLite database of manufacturers, distributors,
salespeople and shoe models, and the Makes, Sells, Contract and Employs
relationships between them. Every write is checked for referential integrity.

Example usage:
  shoedist init
  shoedist load seed.json
  shoedist list makes
  shoedist dump --output backup.json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show row counts per table
    Stats,

    /// List every row of a table, ordered by key
    List {
        /// Table name (e.g. manufacturer, shoes, contract)
        table: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Insert the rows of a dataset JSON file, parents first
    Load {
        /// Dataset file
        file: PathBuf,
    },

    /// Export every row as a dataset JSON document
    Dump {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report rows whose foreign keys point at nothing
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let loaded = config::load_config(cli.config.as_deref())?;
    let database = config::resolve_database_path(cli.database.as_deref(), loaded.as_ref());
    let options = loaded
        .as_ref()
        .map(ShoedistConfig::store_options)
        .unwrap_or_default();

    let open_store = || -> anyhow::Result<SqliteStore> {
        config::ensure_db_dir(&database)?;
        tracing::debug!("Using database {}", database.display());
        Ok(SqliteStore::open_with_options(&database, &options)?)
    };

    match cli.command {
        Commands::Init { force } => {
            run_init(cli.config.as_deref(), &database, force)?;
        }

        Commands::Stats => {
            let store = open_store()?;
            let stats = store.stats()?;
            ui::header(&format!("Statistics ({})", database.display()));
            println!("{}", ui::stats_table(&stats));
        }

        Commands::List { table, json } => {
            let table: Table = table.parse()?;
            let store = open_store()?;
            let mode = OutputMode::from_json_flag(json);
            match table {
                Table::Manufacturer => list_rows::<Manufacturer>(&store, mode)?,
                Table::Distributor => list_rows::<Distributor>(&store, mode)?,
                Table::Salesperson => list_rows::<Salesperson>(&store, mode)?,
                Table::Shoes => list_rows::<Shoes>(&store, mode)?,
                Table::Makes => list_rows::<Makes>(&store, mode)?,
                Table::Sells => list_rows::<Sells>(&store, mode)?,
                Table::Contract => list_rows::<Contract>(&store, mode)?,
                Table::Employs => list_rows::<Employs>(&store, mode)?,
            }
        }

        Commands::Load { file } => {
            let dataset = Dataset::read(&file)?;
            let store = open_store()?;
            ui::header(&format!("Loading {} rows from {}", dataset.len(), file.display()));

            match dataset.apply(&store) {
                Ok(report) => {
                    println!("{}", ui::counts_table("Inserted", &report.inserted));
                    ui::success(&format!("Loaded {} rows", report.total()));
                }
                Err(e) => {
                    ui::error(&e.to_string());
                    anyhow::bail!("load stopped at the first failing row; earlier rows were kept");
                }
            }
        }

        Commands::Dump { output } => {
            let store = open_store()?;
            let dataset = Dataset::export(&store)?;
            match output {
                Some(path) => {
                    dataset.write(&path)?;
                    ui::success(&format!("Wrote {} rows to {}", dataset.len(), path.display()));
                }
                None => println!("{}", dataset.to_json()?),
            }
        }

        Commands::Check => {
            let store = open_store()?;
            let report = store.integrity_report()?;
            if report.is_empty() {
                ui::success("No dangling references");
            } else {
                for dangling in &report {
                    ui::warn(&format!("{} {}", Icons::LINK, dangling));
                }
                anyhow::bail!("{} dangling reference(s)", report.len());
            }
        }
    }

    Ok(())
}

fn run_init(config_path: Option<&Path>, database: &Path, force: bool) -> anyhow::Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path);
    let config = ShoedistConfig {
        database: Some(database.display().to_string()),
        busy_timeout_ms: Some(5_000),
    };

    config::write_config(&config_path, &config, force)?;
    config::ensure_db_dir(database)?;
    SqliteStore::open_with_options(database, &config.store_options())?;

    ui::success("Initialized shoedist");
    ui::info("Config", &config_path.display().to_string());
    ui::info("Database", &database.display().to_string());
    Ok(())
}

fn list_rows<E: Entity + Serialize>(store: &SqliteStore, mode: OutputMode) -> anyhow::Result<()> {
    let rows = store.list::<E>()?;
    if mode.is_human() {
        if rows.is_empty() {
            println!("{}", ui::dim(&format!("{} is empty", E::TABLE)));
        } else {
            println!("{}", ui::rows_table(&rows));
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    }
    Ok(())
}
