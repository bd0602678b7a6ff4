//! SQLite backed implementations of the stores.

mod expense;

pub use expense::SQLiteExpenseStore;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize};

/// Creates an expense store backed by `db_connection`.
///
/// This function will modify the database by adding the tables for the domain
/// models to the database.
///
/// # Errors
/// Returns an [Error::SqlError] if the tables could not be created.
pub fn create_expense_store(db_connection: Connection) -> Result<SQLiteExpenseStore, Error> {
    initialize(&db_connection)?;

    Ok(SQLiteExpenseStore::new(Arc::new(Mutex::new(db_connection))))
}
