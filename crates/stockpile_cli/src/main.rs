//! Command-line front end for the item store.
//!
//! # Responsibility
//! - Act as the application root: resolve config, start logging, open the store.
//! - Map one subcommand onto one store operation and print the outcome.
//!
//! # Invariants
//! - The store worker is created here and dropped before exit.
//! - Failures print to stderr and exit non-zero; nothing panics.

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stockpile_core::{
    init_logging, Item, ItemFilter, ItemQuery, ItemSearch, ItemService, RepoResult,
    SortDirection, SortKey, SqliteItemRepository, StoreConfig, StoreWorker, UNSAVED_LIST_NAME,
};

#[derive(Parser, Debug)]
#[command(name = "stockpile", version, about = "Track household supplies by list")]
struct Cli {
    /// Database file (overrides STOCKPILE_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Directory for rolling log files (overrides STOCKPILE_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error (overrides STOCKPILE_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add an item to the end of a list.
    Add {
        name: String,
        /// Amount left; blank means 0.
        #[arg(long, default_value = "")]
        amount: String,
        #[arg(long, default_value = UNSAVED_LIST_NAME)]
        list: String,
    },
    /// Show one list.
    List {
        #[arg(long, default_value = UNSAVED_LIST_NAME)]
        list: String,
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        #[arg(long, value_enum, default_value_t = SortArg::Order)]
        sort: SortArg,
        #[arg(long)]
        desc: bool,
    },
    Rename {
        id: i64,
        name: String,
    },
    /// Replace the amount of an item.
    Amount {
        id: i64,
        amount: String,
    },
    /// Flip the "topped off" marker of an item.
    ToggleFull {
        id: i64,
    },
    Delete {
        id: i64,
    },
    /// Delete every item of a list matching a filter.
    Clear {
        #[arg(long, default_value = UNSAVED_LIST_NAME)]
        list: String,
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// Search one list by exact name, keyword or amount comparison (e.g. "<= 0").
    Search {
        #[arg(value_enum)]
        mode: SearchMode,
        text: String,
        #[arg(long, default_value = UNSAVED_LIST_NAME)]
        list: String,
    },
    /// Move an item to the end of another list. The item gets a new id.
    Move {
        id: i64,
        target: String,
    },
    /// Move the item at position FROM to position TO within a list.
    Reorder {
        from: usize,
        to: usize,
        #[arg(long, default_value = UNSAVED_LIST_NAME)]
        list: String,
    },
    /// Show saved list names.
    Lists,
    /// Save the working list under a name.
    SaveAs {
        name: String,
    },
    /// Replace the working list with a saved list.
    Load {
        name: String,
    },
    /// Delete a saved list.
    DropList {
        name: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FilterArg {
    All,
    Empty,
    Leftover,
    Full,
}

impl From<FilterArg> for ItemFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => Self::All,
            FilterArg::Empty => Self::Empty,
            FilterArg::Leftover => Self::Leftover,
            FilterArg::Full => Self::Full,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortArg {
    Order,
    Name,
    Amount,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Order => Self::Order,
            SortArg::Name => Self::Name,
            SortArg::Amount => Self::Amount,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SearchMode {
    Exact,
    Keyword,
    Amount,
}

/// What a subcommand produced.
enum Outcome {
    Items(Vec<Item>),
    Names(Vec<String>),
    Affected(usize),
    Created(i64),
    Moved(Option<i64>),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = resolve_config(&cli, StoreConfig::from_env());
    if let Some(log_dir) = &config.log_dir {
        let log_dir = absolute(log_dir)?;
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let worker = StoreWorker::open(&config.db_path)
        .map_err(|err| format!("cannot open `{}`: {err}", config.db_path.display()))?;
    info!("event=cli_run module=cli status=start");
    let outcome = execute(&worker, cli.command)?;
    print_outcome(outcome, cli.json)
}

fn resolve_config(cli: &Cli, mut config: StoreConfig) -> StoreConfig {
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config
}

fn absolute(path: &Path) -> Result<PathBuf, String> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|err| format!("cannot resolve `{}`: {err}", path.display()))
}

fn execute(worker: &StoreWorker, command: Command) -> Result<Outcome, String> {
    let outcome = match command {
        Command::Add { name, amount, list } => Outcome::Created(with_items(worker, move |s| {
            s.add_item(&list, &name, &amount)
        })?),
        Command::List {
            list,
            filter,
            sort,
            desc,
        } => {
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            let query = ItemQuery::new(list)
                .filter(filter.into())
                .sort_by(sort.into(), direction);
            Outcome::Items(with_items(worker, move |s| s.list_items(&query))?)
        }
        Command::Rename { id, name } => {
            Outcome::Affected(with_items(worker, move |s| s.rename_item(id, &name))?)
        }
        Command::Amount { id, amount } => {
            Outcome::Affected(with_items(worker, move |s| s.set_amount(id, &amount))?)
        }
        Command::ToggleFull { id } => {
            Outcome::Affected(with_items(worker, move |s| s.toggle_full(id))?)
        }
        Command::Delete { id } => {
            Outcome::Affected(with_items(worker, move |s| s.delete_item(id))?)
        }
        Command::Clear { list, filter } => Outcome::Affected(with_items(worker, move |s| {
            s.clear(&list, filter.into())
        })?),
        Command::Search { mode, text, list } => {
            let search = match mode {
                SearchMode::Exact => ItemSearch::ExactName { name: text },
                SearchMode::Keyword => ItemSearch::Keyword { keyword: text },
                SearchMode::Amount => {
                    ItemSearch::parse_amount(&text).map_err(|err| err.to_string())?
                }
            };
            Outcome::Items(with_items(worker, move |s| s.search(&list, &search))?)
        }
        Command::Move { id, target } => Outcome::Moved(with_items(worker, move |s| {
            s.move_item_to_list(id, &target)
        })?),
        Command::Reorder { from, to, list } => {
            let mut session = with_items(worker, move |s| s.begin_reorder(&list))?;
            session.move_item(from, to).map_err(|err| err.to_string())?;
            let items = session.items().to_vec();
            with_items(worker, move |s| s.finish_reorder(session))?;
            Outcome::Items(items)
        }
        Command::Lists => Outcome::Names(with_items(worker, |s| s.list_names())?),
        Command::SaveAs { name } => Outcome::Affected(with_items(worker, move |s| {
            s.save_working_list_as(&name)
        })?),
        Command::Load { name } => Outcome::Affected(with_items(worker, move |s| {
            s.load_list_into_working(&name)
        })?),
        Command::DropList { name } => {
            Outcome::Affected(with_items(worker, move |s| s.delete_list(&name))?)
        }
    };
    Ok(outcome)
}

fn with_items<T, F>(worker: &StoreWorker, f: F) -> Result<T, String>
where
    F: FnOnce(&ItemService<SqliteItemRepository<'_>>) -> RepoResult<T> + Send + 'static,
    T: Send + 'static,
{
    worker.with_items(f).map_err(|err| err.to_string())
}

fn print_outcome(outcome: Outcome, as_json: bool) -> Result<(), String> {
    if as_json {
        let value = match outcome {
            Outcome::Items(items) => json!({ "items": items }),
            Outcome::Names(names) => json!({ "lists": names }),
            Outcome::Affected(affected) => json!({ "affected": affected }),
            Outcome::Created(id) => json!({ "item_id": id }),
            Outcome::Moved(id) => json!({ "item_id": id, "affected": usize::from(id.is_some()) }),
        };
        let text = serde_json::to_string_pretty(&value).map_err(|err| err.to_string())?;
        println!("{text}");
        return Ok(());
    }

    match outcome {
        Outcome::Items(items) => {
            for item in items {
                println!(
                    "{}\t{}\t{}\t{}",
                    item.id,
                    item.state().as_str(),
                    item.amount,
                    item.name
                );
            }
        }
        Outcome::Names(names) => {
            for name in names {
                println!("{name}");
            }
        }
        Outcome::Affected(affected) => println!("affected={affected}"),
        Outcome::Created(id) => println!("created item_id={id}"),
        Outcome::Moved(Some(id)) => println!("moved item_id={id}"),
        Outcome::Moved(None) => println!("affected=0"),
    }
    Ok(())
}
