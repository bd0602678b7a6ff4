use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime, UtcOffset};

use expense_tracker::{
    ExpenseForm, ExpenseService, PasswordHash, Session, ValidatedPassword, create_user,
    initialize_db, stores::sqlite::SQLiteExpenseStore,
};

/// A utility for creating a test database for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const SAMPLE_EXPENSES: [(i64, &str, &str, &str); 6] = [
    (0, "food", "12.50", "Lunch"),
    (1, "transport", "3.20", "Bus fare"),
    (3, "food", "7.60", "Snacks"),
    (7, "utilities", "84.00", "Power bill"),
    (12, "entertainment", "18.00", "Cinema"),
    (40, "housing", "950.00", "Rent"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user \"test\" with the password \"password1\"...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("password1"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("test", password_hash, &conn)?;
    let session = Session::from(&user);

    println!("Adding sample expenses...");

    let service = ExpenseService::new(
        SQLiteExpenseStore::new(Arc::new(Mutex::new(conn))),
        UtcOffset::UTC,
    );
    let today = OffsetDateTime::now_utc().date();

    for (days_ago, category, amount, description) in SAMPLE_EXPENSES {
        let form = ExpenseForm {
            date: (today - Duration::days(days_ago)).to_string(),
            category: category.to_owned(),
            amount: amount.to_owned(),
            description: description.to_owned(),
        };
        service.create(&session, &form)?;
    }

    println!("Success!");

    Ok(())
}
