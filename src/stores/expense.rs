//! Defines the expense store trait.

use time::Date;

use crate::{
    Error,
    category::Category,
    expense::{Expense, ExpenseID},
    money::Cents,
    user::UserID,
};

/// Handles the persistence, retrieval and aggregation of expenses.
///
/// Implementations do not validate expenses, that is done before an expense
/// reaches the store.
pub trait ExpenseStore {
    /// Retrieve an expense by its `id`, `None` if there is no such expense.
    fn get(&self, id: ExpenseID) -> Result<Option<Expense>, Error>;

    /// Persist `expense`.
    ///
    /// An expense without an ID is inserted and given the newly generated ID.
    /// Otherwise the stored expense with the same ID is overwritten.
    fn save(&self, expense: &mut Expense) -> Result<(), Error>;

    /// Delete the expense with `id`. Deleting a missing expense is not an error.
    fn delete(&self, id: ExpenseID) -> Result<(), Error>;

    /// Retrieve the expenses matching every filter in `query`, newest first.
    fn find_by(&self, query: ExpenseQuery) -> Result<Vec<Expense>, Error>;

    /// Whether an expense with exactly the values in `key` is already stored.
    fn find_duplicate(&self, key: &ExpenseKey) -> Result<bool, Error>;

    /// Count the expenses `user_id` has in the given calendar month.
    fn count(&self, user_id: UserID, year: i32, month: u8) -> Result<u64, Error>;

    /// The distinct years in which `user_id` has expenses, latest first.
    fn list_years(&self, user_id: UserID) -> Result<Vec<i32>, Error>;

    /// The sum of the expenses `user_id` has in the given month, zero if there are none.
    fn total_for_month(&self, user_id: UserID, year: i32, month: u8) -> Result<Cents, Error>;

    /// The sum of each category's expenses in the given month.
    ///
    /// Categories without expenses in the month are left out rather than
    /// reported as zero.
    fn totals_by_category(
        &self,
        user_id: UserID,
        year: i32,
        month: u8,
    ) -> Result<Vec<(Category, Cents)>, Error>;

    /// The mean expense amount, in major units, for each category in the given month.
    ///
    /// Categories without expenses in the month are left out.
    fn averages_by_category(
        &self,
        user_id: UserID,
        year: i32,
        month: u8,
    ) -> Result<Vec<(Category, f64)>, Error>;

    /// Start a transaction. Every store call until [ExpenseStore::commit] or
    /// [ExpenseStore::roll_back] is part of it.
    ///
    /// The transaction belongs to the underlying connection, not to this
    /// handle. Writes made through any other handle sharing the connection
    /// while it is open are committed or rolled back with it, so a store must
    /// not be shared between users while a transaction is open.
    ///
    /// # Errors
    /// Returns [Error::TransactionAlreadyActive] if a transaction is already open,
    /// transactions do not nest.
    fn begin_transaction(&self) -> Result<(), Error>;

    /// Make the changes in the open transaction permanent.
    fn commit(&self) -> Result<(), Error>;

    /// Discard the changes in the open transaction.
    fn roll_back(&self) -> Result<(), Error>;
}

/// A predicate that stored expenses must satisfy to be returned by [ExpenseStore::find_by].
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseFilter {
    /// Expenses belonging to a user.
    User(UserID),
    /// Expenses dated within a calendar month, whatever the day.
    YearMonth {
        /// The calendar year, e.g. 2024.
        year: i32,
        /// The month of the year, 1 to 12.
        month: u8,
    },
    /// Expenses dated within a calendar year.
    Year(i32),
    /// Expenses on an exact date.
    Date(Date),
    /// Expenses in a category.
    Category(Category),
    /// Expenses of an exact amount.
    Amount(Cents),
    /// Expenses with an exact description.
    Description(String),
}

/// Defines which expenses [ExpenseStore::find_by] fetches and how many.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseQuery {
    /// Expenses must match all of these filters. No filters matches everything.
    pub filters: Vec<ExpenseFilter>,
    /// Selects up to the first N (`limit`) expenses, `None` selects all of them.
    pub limit: Option<u64>,
    /// Ignore the first N expenses. Only has an effect if `limit` is not `None`.
    pub offset: u64,
}

/// The values that identify an expense for duplicate detection.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseKey {
    /// The owner of the expense.
    pub user_id: UserID,
    /// The date of the expense.
    pub date: Date,
    /// The trimmed description.
    pub description: String,
    /// The category of the expense.
    pub category: Category,
    /// The amount in cents.
    pub amount: Cents,
}

impl From<&Expense> for ExpenseKey {
    fn from(expense: &Expense) -> Self {
        Self {
            user_id: expense.user_id,
            date: expense.date,
            description: expense.description.clone(),
            category: expense.category,
            amount: expense.amount,
        }
    }
}
