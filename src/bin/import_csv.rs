use std::{fs::File, io::BufReader, path::PathBuf, process::exit};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    Config, DEFAULT_TIMEZONE, Error, ExpenseService, get_local_offset, log_in,
    stores::sqlite::create_expense_store,
};

/// Import expenses from a CSV file of `date,description,amount,category` rows.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database. Without it, the settings
    /// are read from the `DB_PATH` and `TIMEZONE` environment variables.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// The user to import the expenses for.
    #[arg(long, short)]
    username: String,

    /// The CSV file to import.
    #[arg(long, short)]
    file: PathBuf,

    /// The canonical timezone used to decide which dates are in the future.
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    timezone: String,
}

fn main() {
    setup_logging();

    let args = Args::parse();

    if let Err(error) = run(args) {
        eprintln!("Import failed: {error}");
        exit(1);
    }
}

fn run(args: Args) -> Result<(), Error> {
    let (db_path, local_offset) = match args.db_path {
        Some(db_path) => (db_path, get_local_offset(&args.timezone)?),
        None => {
            let config = Config::from_env()?;
            (config.db_path, config.local_offset)
        }
    };

    if !db_path.is_file() {
        eprintln!("File does not exist at {db_path:#?}!");
        exit(1);
    }

    let conn = Connection::open(&db_path)?;

    let password = rpassword::prompt_password(format!("Password for {}: ", args.username))
        .map_err(|error| Error::ReadError(error.to_string()))?;
    let session = log_in(&args.username, &password, &conn)?;

    let file = File::open(&args.file).map_err(|error| Error::ReadError(error.to_string()))?;
    let service = ExpenseService::new(create_expense_store(conn)?, local_offset);
    let summary = service.import_csv(&session, BufReader::new(file))?;

    println!("Imported {} of {} rows.", summary.imported, summary.total_processed);
    println!("Skipped {} duplicates.", summary.skipped.duplicates);
    println!(
        "Skipped {} rows with an unknown category.",
        summary.skipped.invalid_categories
    );
    println!("Skipped {} invalid rows.", summary.skipped.invalid_data);

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
