//! Implements a SQLite backed expense store.
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row, params_from_iter, types::Type, types::Value};

use crate::{
    Error,
    category::Category,
    db::{CreateTable, MapRow},
    expense::{Expense, ExpenseID},
    money::Cents,
    stores::{ExpenseFilter, ExpenseKey, ExpenseQuery, ExpenseStore},
    user::UserID,
};

const SELECT_EXPENSE: &str =
    "SELECT id, user_id, date, category, amount_cents, description FROM expense";

// Dates are stored as `YYYY-MM-DD` text, so calendar parts are extracted with
// strftime and compared as zero-padded strings.
const YEAR_MONTH_CLAUSE: &str = "user_id = ?1 AND strftime('%Y', date) = ?2 AND strftime('%m', date) = ?3";

/// Stores expenses in a SQLite database.
///
/// Note that because an expense depends on the [User](crate::user::User) model,
/// the user table must be set up in the database.
///
/// Clones share one connection, and with it any open transaction, see
/// [ExpenseStore::begin_transaction].
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|_| Error::DatabaseLockError)
    }
}

fn year_param(year: i32) -> String {
    format!("{year:04}")
}

fn month_param(month: u8) -> String {
    format!("{month:02}")
}

fn map_category(row: &Row, index: usize) -> Result<Category, rusqlite::Error> {
    let raw_category: String = row.get(index)?;

    raw_category
        .parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

impl ExpenseStore for SQLiteExpenseStore {
    /// Retrieve an expense in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is some SQL error.
    fn get(&self, id: ExpenseID) -> Result<Option<Expense>, Error> {
        let result = self
            .connection()?
            .prepare(&format!("{SELECT_EXPENSE} WHERE id = :id"))?
            .query_row(&[(":id", &id)], Self::map_row);

        match result {
            Ok(expense) => Ok(Some(expense)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Insert or update `expense` depending on whether it has an ID.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the expense has an ID that is not in the database,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn save(&self, expense: &mut Expense) -> Result<(), Error> {
        let connection = self.connection()?;

        match expense.id {
            None => {
                let id = connection
                    .prepare(
                        "INSERT INTO expense (user_id, date, category, amount_cents, description)
                         VALUES (?1, ?2, ?3, ?4, ?5)
                         RETURNING id",
                    )?
                    .query_row(
                        (
                            expense.user_id.as_i64(),
                            expense.date,
                            expense.category.as_str(),
                            expense.amount.as_i64(),
                            &expense.description,
                        ),
                        |row| row.get(0),
                    )?;

                expense.id = Some(id);
            }
            Some(id) => {
                let rows_affected = connection.execute(
                    "UPDATE expense
                     SET user_id = ?1, date = ?2, category = ?3, amount_cents = ?4, description = ?5
                     WHERE id = ?6",
                    (
                        expense.user_id.as_i64(),
                        expense.date,
                        expense.category.as_str(),
                        expense.amount.as_i64(),
                        &expense.description,
                        id,
                    ),
                )?;

                if rows_affected == 0 {
                    return Err(Error::NotFound);
                }
            }
        }

        Ok(())
    }

    fn delete(&self, id: ExpenseID) -> Result<(), Error> {
        self.connection()?
            .execute("DELETE FROM expense WHERE id = ?1", (id,))?;

        Ok(())
    }

    /// Query for expenses in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is an SQL error.
    fn find_by(&self, query: ExpenseQuery) -> Result<Vec<Expense>, Error> {
        let mut query_string_parts = vec![SELECT_EXPENSE.to_owned()];
        let mut where_clause_parts = vec![];
        let mut query_parameters = vec![];

        for filter in query.filters {
            let next = query_parameters.len() + 1;

            match filter {
                ExpenseFilter::User(user_id) => {
                    where_clause_parts.push(format!("user_id = ?{next}"));
                    query_parameters.push(Value::Integer(user_id.as_i64()));
                }
                ExpenseFilter::YearMonth { year, month } => {
                    where_clause_parts.push(format!(
                        "strftime('%Y', date) = ?{next} AND strftime('%m', date) = ?{}",
                        next + 1
                    ));
                    query_parameters.push(Value::Text(year_param(year)));
                    query_parameters.push(Value::Text(month_param(month)));
                }
                ExpenseFilter::Year(year) => {
                    where_clause_parts.push(format!("strftime('%Y', date) = ?{next}"));
                    query_parameters.push(Value::Text(year_param(year)));
                }
                ExpenseFilter::Date(date) => {
                    where_clause_parts.push(format!("date = ?{next}"));
                    query_parameters.push(Value::Text(date.to_string()));
                }
                ExpenseFilter::Category(category) => {
                    where_clause_parts.push(format!("category = ?{next}"));
                    query_parameters.push(Value::Text(category.as_str().to_owned()));
                }
                ExpenseFilter::Amount(amount) => {
                    where_clause_parts.push(format!("amount_cents = ?{next}"));
                    query_parameters.push(Value::Integer(amount.as_i64()));
                }
                ExpenseFilter::Description(description) => {
                    where_clause_parts.push(format!("description = ?{next}"));
                    query_parameters.push(Value::Text(description));
                }
            }
        }

        if !where_clause_parts.is_empty() {
            query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        }

        query_string_parts.push("ORDER BY date DESC, id DESC".to_owned());

        // SQLite reads LIMIT and OFFSET as signed 64 bit integers.
        if let Some(limit) = query.limit {
            query_string_parts.push(format!(
                "LIMIT {} OFFSET {}",
                limit.min(i64::MAX as u64),
                query.offset.min(i64::MAX as u64)
            ));
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection()?
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::from))
            .collect()
    }

    fn find_duplicate(&self, key: &ExpenseKey) -> Result<bool, Error> {
        self.connection()?
            .prepare_cached(
                "SELECT 1 FROM expense
                 WHERE user_id = ?1 AND date = ?2 AND description = ?3 AND category = ?4 AND amount_cents = ?5",
            )?
            .exists((
                key.user_id.as_i64(),
                key.date,
                &key.description,
                key.category.as_str(),
                key.amount.as_i64(),
            ))
            .map_err(Error::from)
    }

    fn count(&self, user_id: UserID, year: i32, month: u8) -> Result<u64, Error> {
        self.connection()?
            .query_row(
                &format!("SELECT COUNT(id) FROM expense WHERE {YEAR_MONTH_CLAUSE}"),
                (user_id.as_i64(), year_param(year), month_param(month)),
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count.max(0) as u64)
            .map_err(Error::from)
    }

    fn list_years(&self, user_id: UserID) -> Result<Vec<i32>, Error> {
        self.connection()?
            .prepare(
                "SELECT DISTINCT CAST(strftime('%Y', date) AS INTEGER) AS year
                 FROM expense WHERE user_id = ?1 ORDER BY year DESC",
            )?
            .query_map((user_id.as_i64(),), |row| row.get(0))?
            .map(|maybe_year| maybe_year.map_err(Error::from))
            .collect()
    }

    fn total_for_month(&self, user_id: UserID, year: i32, month: u8) -> Result<Cents, Error> {
        // SUM over no rows is NULL.
        self.connection()?
            .query_row(
                &format!(
                    "SELECT COALESCE(SUM(amount_cents), 0) FROM expense WHERE {YEAR_MONTH_CLAUSE}"
                ),
                (user_id.as_i64(), year_param(year), month_param(month)),
                |row| row.get(0).map(Cents::new),
            )
            .map_err(Error::from)
    }

    fn totals_by_category(
        &self,
        user_id: UserID,
        year: i32,
        month: u8,
    ) -> Result<Vec<(Category, Cents)>, Error> {
        self.connection()?
            .prepare(&format!(
                "SELECT category, SUM(amount_cents) FROM expense
                 WHERE {YEAR_MONTH_CLAUSE} GROUP BY category ORDER BY category"
            ))?
            .query_map(
                (user_id.as_i64(), year_param(year), month_param(month)),
                |row| Ok((map_category(row, 0)?, Cents::new(row.get(1)?))),
            )?
            .map(|maybe_total| maybe_total.map_err(Error::from))
            .collect()
    }

    fn averages_by_category(
        &self,
        user_id: UserID,
        year: i32,
        month: u8,
    ) -> Result<Vec<(Category, f64)>, Error> {
        self.connection()?
            .prepare(&format!(
                "SELECT category, AVG(amount_cents) / 100.0 FROM expense
                 WHERE {YEAR_MONTH_CLAUSE} GROUP BY category ORDER BY category"
            ))?
            .query_map(
                (user_id.as_i64(), year_param(year), month_param(month)),
                |row| Ok((map_category(row, 0)?, row.get(1)?)),
            )?
            .map(|maybe_average| maybe_average.map_err(Error::from))
            .collect()
    }

    fn begin_transaction(&self) -> Result<(), Error> {
        let connection = self.connection()?;

        if !connection.is_autocommit() {
            return Err(Error::TransactionAlreadyActive);
        }

        connection.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&self) -> Result<(), Error> {
        let connection = self.connection()?;

        if connection.is_autocommit() {
            return Err(Error::NoActiveTransaction);
        }

        connection.execute_batch("COMMIT")?;
        Ok(())
    }

    fn roll_back(&self) -> Result<(), Error> {
        let connection = self.connection()?;

        if connection.is_autocommit() {
            return Err(Error::NoActiveTransaction);
        }

        connection.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl CreateTable for SQLiteExpenseStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS expense (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    date TEXT NOT NULL,
                    category TEXT NOT NULL,
                    amount_cents INTEGER NOT NULL,
                    description TEXT NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteExpenseStore {
    type ReturnType = Expense;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Expense {
            id: Some(row.get(offset)?),
            user_id: UserID::new(row.get(offset + 1)?),
            date: row.get(offset + 2)?,
            category: map_category(row, offset + 3)?,
            amount: Cents::new(row.get(offset + 4)?),
            description: row.get(offset + 5)?,
        })
    }
}
