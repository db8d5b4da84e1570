use clap::{Parser, Subcommand};
use serde::Serialize;
use shelf_import::config::Config;
use shelf_import::{BookFilter, BookStore, ReadingStatus, SqliteBookStore};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shelf-import", version, about = "Import reading history into the shelf library")]
struct Cli {
    /// Library database (defaults to $SHELF_DB_PATH, then ./shelf.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import an export file through a connector
    Import {
        /// Connector name, e.g. goodreads
        connector: String,
        file: PathBuf,
        /// Validate and look up rows without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List books in the library
    List {
        #[arg(long)]
        status: Option<ReadingStatus>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one book
    Get { id: String },
    /// Remove one book
    Delete { id: String },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = Config::from_env().with_db_path(cli.db);
    let mut store = SqliteBookStore::open(&config.db_path).map_err(|err| err.to_string())?;

    match cli.command {
        Command::Import {
            connector,
            file,
            dry_run,
        } => {
            let result = shelf_import::import(&mut store, &connector, &file, dry_run)
                .map_err(|err| err.to_string())?;
            print_json(&result)
        }
        Command::List {
            status,
            rating,
            limit,
        } => {
            let books = store
                .list(&BookFilter {
                    status,
                    rating,
                    limit,
                })
                .map_err(|err| err.to_string())?;
            print_json(&books)
        }
        Command::Get { id } => match store.get(&id).map_err(|err| err.to_string())? {
            Some(book) => print_json(&book),
            None => Err(format!("Book {} not found", id)),
        },
        Command::Delete { id } => {
            if store.delete(&id).map_err(|err| err.to_string())? {
                log::info!("deleted book {}", id);
                Ok(())
            } else {
                Err(format!("Book {} not found", id))
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{}", text);
    Ok(())
}
