use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dp_cli::commands::{add, conflicts, day, edit, list, rm, show, status, week};
use dp_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(dp_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = dp_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let today = Local::now().date_naive();
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Add(args) => add::run(&mut out, &mut db, &config, args, today)?,
        Commands::Edit(args) => edit::run(&mut out, &mut db, args, today)?,
        Commands::Rm { id } => rm::run(&mut out, &mut db, id)?,
        Commands::Show { id, json } => show::run(&mut out, &db, id, *json)?,
        Commands::List { from, to, json } => {
            list::run(&mut out, &db, from.as_deref(), to.as_deref(), *json, today)?;
        }
        Commands::Day { date, json } => {
            day::run(&mut out, &db, &config.layout, date.as_deref(), *json, today)?;
        }
        Commands::Week { date, json } => {
            week::run(&mut out, &db, &config.layout, date.as_deref(), *json, today)?;
        }
        Commands::Conflicts { id, json } => conflicts::run(&mut out, &db, id, *json)?,
        Commands::Status => status::run(&mut out, &db, &config)?,
    }

    Ok(())
}
