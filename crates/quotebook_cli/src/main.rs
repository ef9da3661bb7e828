//! `quotebook` command-line front end.
//!
//! # Responsibility
//! - Resolve configuration, logging and storage for one invocation.
//! - Map subcommands onto `quotebook_core` use cases and print outcomes.

mod commands;

use clap::{Parser, Subcommand};
use log::{error, info};
use quotebook_core::db::open_db;
use quotebook_core::{
    default_config_path, init_logging, KvScope, QuoteService, QuotebookConfig, SqliteKvStore,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "quotebook", version, about = "Keep, browse and sync a personal quote collection")]
struct Cli {
    /// Config file (default: <config_dir>/quotebook/config.toml)
    #[arg(long, global = true, env = "QUOTEBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file, overrides `storage.db_path`
    #[arg(long, global = true, env = "QUOTEBOOK_DB")]
    db: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error), overrides `logging.level`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show the current quote
    Show,
    /// Show the next quote (wraps around)
    Next,
    /// Show the previous quote (wraps around)
    Prev,
    /// Show a random quote from the selected category
    Random,
    /// List all quotes with their positions
    List,
    /// Add a quote
    Add {
        text: String,
        #[arg(long, short)]
        category: Option<String>,
    },
    /// Remove the quote at a position shown by `list`
    Remove {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        position: u64,
    },
    /// List categories and mark the selected one
    Categories,
    /// Select the category used by `random` (`all` for every quote)
    Filter { category: String },
    /// Import quotes from a JSON array file
    Import { file: PathBuf },
    /// Export quotes as pretty JSON (stdout when no file is given)
    Export { file: Option<PathBuf> },
    /// Restore the default quotes
    Clear {
        /// Also reset browsing state (cursor, last viewed quote)
        #[arg(long)]
        all: bool,
    },
    /// Merge quotes from the remote endpoint (remote wins on conflicts)
    Sync {
        /// POST the merged set back to the endpoint
        #[arg(long)]
        publish: bool,
        /// Keep syncing on an interval
        #[arg(long)]
        watch: bool,
        /// Seconds between cycles in watch mode
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: Option<u64>,
        /// Stop watch mode after this many cycles
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        cycles: Option<u32>,
        /// Remote endpoint, overrides `sync.endpoint`
        #[arg(long)]
        endpoint: Option<String>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Next => "next",
            Self::Prev => "prev",
            Self::Random => "random",
            Self::List => "list",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Categories => "categories",
            Self::Filter { .. } => "filter",
            Self::Import { .. } => "import",
            Self::Export { .. } => "export",
            Self::Clear { .. } => "clear",
            Self::Sync { .. } => "sync",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = QuotebookConfig::load_or_default(&config_path)?;
    if let Some(db) = cli.db {
        config.storage.db_path = Some(db);
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    if let Err(err) = init_logging(&config.logging.level, &config.resolved_log_dir()) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let conn = open_db(config.resolved_db_path())?;
    let mut quotes = QuoteService::open(
        SqliteKvStore::new(&conn, KvScope::Local),
        SqliteKvStore::new(&conn, KvScope::Session),
    )?;
    if quotes.restored_defaults() {
        eprintln!("note: no usable saved quotes, default quotes restored");
    }

    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );
    commands::execute(cli.command, &mut quotes, &config)
}
