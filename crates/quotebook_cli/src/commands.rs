//! Subcommand handlers.

use crate::Command;
use quotebook_core::{
    ConflictNotifier, HttpQuoteRemote, KeyValueStore, LogNotifier, Quote, QuoteService,
    QuotebookConfig, SyncOptions, SyncService,
};
use std::error::Error;
use std::time::Duration;

type CommandResult = Result<(), Box<dyn Error>>;

pub(crate) fn execute<L, S>(
    command: Command,
    quotes: &mut QuoteService<L, S>,
    config: &QuotebookConfig,
) -> CommandResult
where
    L: KeyValueStore,
    S: KeyValueStore,
{
    match command {
        Command::Show => print_optional(quotes.current()),
        Command::Next => print_optional(quotes.show_next()?),
        Command::Prev => print_optional(quotes.show_prev()?),
        Command::Random => {
            let mut rng = rand::thread_rng();
            match quotes.show_random(&mut rng)? {
                Some(quote) => println!("{}", format_quote(quote)),
                None => println!("No quotes in this category yet."),
            }
        }
        Command::List => list(quotes),
        Command::Add { text, category } => {
            let added = quotes.add_quote(&text, category.as_deref())?;
            println!("Quote added: {}", format_quote(added));
        }
        Command::Remove { position } => {
            let index = usize::try_from(position - 1)?;
            let removed = quotes.remove_quote(index)?;
            println!("Removed: {}", format_quote(&removed));
        }
        Command::Categories => {
            for category in quotes.categories() {
                let marker = if category == quotes.selected_category() {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {category}");
            }
        }
        Command::Filter { category } => {
            let matching = quotes.select_category(&category)?;
            println!(
                "Selected `{}`: {matching} quote(s).",
                quotes.selected_category()
            );
        }
        Command::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .map_err(|err| format!("failed to read `{}`: {err}", file.display()))?;
            let outcome = quotes.import_json(&raw)?;
            println!("{}", outcome.message());
        }
        Command::Export { file } => {
            let json = quotes.export_json();
            match file {
                Some(path) => {
                    std::fs::write(&path, json + "\n")
                        .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?;
                    eprintln!("Quotes exported to {}.", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Clear { all } => {
            if all {
                quotes.clear_all()?;
                println!("Saved quotes and session state cleared. Default quotes restored.");
            } else {
                quotes.clear_saved()?;
                println!("Saved quotes cleared. Default quotes restored.");
            }
        }
        Command::Sync {
            publish,
            watch,
            interval_secs,
            cycles,
            endpoint,
        } => {
            let mut sync_config = config.sync.clone();
            if let Some(endpoint) = endpoint {
                sync_config.endpoint = endpoint;
            }
            if let Some(interval_secs) = interval_secs {
                sync_config.interval_secs = interval_secs;
            }
            sync_config.publish |= publish;
            sync(quotes, &sync_config, watch, cycles)?;
        }
    }
    Ok(())
}

fn sync<L, S>(
    quotes: &mut QuoteService<L, S>,
    config: &quotebook_core::SyncConfig,
    watch: bool,
    cycles: Option<u32>,
) -> CommandResult
where
    L: KeyValueStore,
    S: KeyValueStore,
{
    let remote = HttpQuoteRemote::from_config(config)?;
    let service = SyncService::new(
        remote,
        SyncOptions {
            publish: config.publish,
        },
    );
    let mut notifier = |message: &str| {
        eprintln!("{message}");
        LogNotifier.notify(message);
    };

    if !watch {
        let report = service.run_cycle(quotes, &mut notifier)?;
        println!("{}", report.message());
        return Ok(());
    }

    let summary = service.run_periodic(
        quotes,
        &mut notifier,
        Duration::from_secs(config.interval_secs),
        cycles,
        |cycle, result| match result {
            Ok(report) => println!("[cycle {cycle}] {}", report.message()),
            Err(err) => eprintln!("[cycle {cycle}] sync failed: {err}"),
        },
    );
    println!(
        "Sync finished: {} cycle(s), {} failed.",
        summary.cycles, summary.failures
    );
    Ok(())
}

fn list<L, S>(quotes: &QuoteService<L, S>)
where
    L: KeyValueStore,
    S: KeyValueStore,
{
    if quotes.is_empty() {
        println!("No quotes saved yet.");
        return;
    }
    for (index, quote) in quotes.quotes().iter().enumerate() {
        let marker = if index == quotes.cursor() { "*" } else { " " };
        println!("{marker} {:>3}. {}", index + 1, format_quote(quote));
    }
}

fn print_optional(quote: Option<&Quote>) {
    match quote {
        Some(quote) => println!("{}", format_quote(quote)),
        None => println!("No quotes saved yet."),
    }
}

fn format_quote(quote: &Quote) -> String {
    match quote.category.as_deref() {
        Some(category) => format!("\"{}\" — ({category})", quote.text),
        None => format!("\"{}\"", quote.text),
    }
}
