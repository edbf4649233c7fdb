//! drinktoken - a personal drink counter
//!
//! Logs drinks per calendar day and reports today's count, the rolling
//! seven-day count, and per-day and per-week averages since the log began.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/drinktoken/DrinkToken.db (~/.local/share/drinktoken/DrinkToken.db)
//! - Config: $XDG_CONFIG_HOME/drinktoken/config.toml (~/.config/drinktoken/config.toml)
//! - Logs: $XDG_STATE_HOME/drinktoken/ (~/.local/state/drinktoken/)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use drinktoken_core::{Config, Store, Summary};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "drinktoken")]
#[command(about = "Count drinks per day and track your averages")]
#[command(version)]
struct Args {
    /// Database file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show today's count, this week's count, and averages (default)
    Stats {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Log one drink today
    Add,

    /// Take back one of today's drinks
    Undo,

    /// List logged days
    History {
        /// Number of days to look back, today included
        #[arg(short, long, default_value_t = 7)]
        days: u32,
    },

    /// Delete all logged drinks and start over from today
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show where data is stored
    Info,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        drinktoken_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = args
        .database
        .clone()
        .unwrap_or_else(|| config.resolved_database_path());
    let store = Store::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

    let command = args.command.unwrap_or(Command::Stats {
        format: Format::Text,
    });

    let result = match command {
        Command::Stats { format } => cmd_stats(&store, format),
        Command::Add => cmd_add(&store),
        Command::Undo => cmd_undo(&store),
        Command::History { days } => cmd_history(&store, days),
        Command::Clear { yes } => cmd_clear(&store, yes),
        Command::Info => cmd_info(&store, &db_path),
    };

    finish(result, store.close())
}

/// Combine a command's outcome with closing the store.
///
/// A command error takes precedence; a close failure after it is only logged.
fn finish(result: Result<()>, close: drinktoken_core::Result<()>) -> Result<()> {
    match (result, close) {
        (Err(e), Err(close_err)) => {
            tracing::warn!(error = %close_err, "Failed to close database after command error");
            Err(e)
        }
        (result, close) => {
            close.context("failed to close database")?;
            result
        }
    }
}

fn cmd_stats(store: &Store, format: Format) -> Result<()> {
    let summary = store.summary().context("failed to compute statistics")?;

    match format {
        Format::Text => print_summary(&summary),
        Format::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}

fn cmd_add(store: &Store) -> Result<()> {
    store.increment().context("failed to log drink")?;
    tracing::info!(day = %store.today(), "Logged drink");

    cmd_stats(store, Format::Text)
}

fn cmd_undo(store: &Store) -> Result<()> {
    if !store.decrement().context("failed to undo drink")? {
        println!("Cannot undo yesterday's mistakes.");
        return Ok(());
    }
    tracing::info!(day = %store.today(), "Removed drink");

    cmd_stats(store, Format::Text)
}

fn cmd_history(store: &Store, days: u32) -> Result<()> {
    let entries = store
        .recent_entries(days)
        .context("failed to load history")?;

    if entries.is_empty() {
        println!("No drinks logged in the last {} day(s).", days);
        return Ok(());
    }

    for entry in &entries {
        println!("{}  {:>3}", entry.date.format("%a %Y-%m-%d"), entry.count);
    }

    let total: i64 = entries.iter().map(|e| e.count).sum();
    println!();
    println!("{} drink(s) over the last {} day(s)", total, days);

    Ok(())
}

fn cmd_clear(store: &Store, yes: bool) -> Result<()> {
    if !yes && !confirm("Do you really want to clear all data? This action cannot be undone.")? {
        println!("Nothing was cleared.");
        return Ok(());
    }

    store.clear().context("failed to clear data")?;
    tracing::info!(day = %store.today(), "Cleared all data");
    println!("You are a clean slate.");

    Ok(())
}

fn cmd_info(store: &Store, db_path: &std::path::Path) -> Result<()> {
    let schema_version = store
        .database()
        .schema_version()
        .context("failed to read schema version")?;
    let metadata = store.metadata().context("failed to read metadata")?;

    println!("Database:       {}", db_path.display());
    println!("Schema version: {}", schema_version);
    println!("Created:        {}", metadata.created_date);
    println!("Config:         {}", Config::config_path().display());
    println!("Logs:           {}", Config::state_dir().display());

    Ok(())
}

fn print_summary(summary: &Summary) {
    println!("Today:          {}", summary.daily_count);
    println!("This week:      {}", summary.weekly_count);
    println!(
        "Daily average:  {}",
        Summary::format_average(summary.daily_average)
    );
    println!(
        "Weekly average: {}",
        Summary::format_average(summary.weekly_average)
    );
}

/// Ask a yes/no question on stdin; anything but "y" or "yes" is a no.
fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    println!();

    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
