//! The operations users perform on their expenses.
//!
//! [ExpenseService] validates user input, scopes every query to the user in
//! the [Session] and runs CSV imports inside a single store transaction.

use std::io::Read;

use serde::Serialize;
use time::{Date, UtcOffset};

use crate::{
    Error,
    auth::Session,
    csv_import::{CsvRow, ImportSummary, SkipReason, read_rows},
    expense::{Expense, ExpenseFields, ExpenseForm, ExpenseID},
    pagination::{
        PaginationConfig, PaginationIndicator, create_pagination_indicators, page_count,
    },
    stores::{ExpenseFilter, ExpenseKey, ExpenseQuery, ExpenseStore},
    timezone,
};

/// One page of a user's expenses for a month, with what is needed to page
/// through the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpensePage {
    /// The expenses on this page, newest first.
    pub expenses: Vec<Expense>,
    /// How many expenses the user has in the month.
    pub total_count: u64,
    /// The page number of this page, starting from 1.
    pub page: u64,
    /// The number of pages in the month.
    pub page_count: u64,
    /// The controls for moving to other pages.
    pub indicators: Vec<PaginationIndicator>,
}

/// Creates, edits, lists and imports expenses on behalf of users.
#[derive(Debug, Clone)]
pub struct ExpenseService<S> {
    store: S,
    local_timezone: UtcOffset,
}

impl<S: ExpenseStore> ExpenseService<S> {
    /// Create a service over `store`.
    ///
    /// `local_timezone` decides which date is "today" when checking that
    /// expenses are not dated in the future.
    pub fn new(store: S, local_timezone: UtcOffset) -> Self {
        Self {
            store,
            local_timezone,
        }
    }

    /// The underlying store, for reads that need no validation such as the
    /// dashboard aggregates.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn today(&self) -> Date {
        timezone::today(self.local_timezone)
    }

    /// Validate `form` and save it as a new expense for the user in `session`.
    ///
    /// # Errors
    /// Returns an [Error::Validation] holding every invalid field, or a store
    /// error if the expense could not be saved.
    pub fn create(&self, session: &Session, form: &ExpenseForm) -> Result<Expense, Error> {
        let fields = form.validate(self.today())?;

        self.insert(session, fields)
    }

    fn insert(&self, session: &Session, fields: ExpenseFields) -> Result<Expense, Error> {
        let mut expense = Expense::new(session.user_id, fields);
        self.store.save(&mut expense)?;

        Ok(expense)
    }

    /// Validate `form` and overwrite the fields of `expense` with it.
    ///
    /// The ID and owner of `expense` are kept. `expense` is left untouched if
    /// validation fails.
    ///
    /// # Errors
    /// Returns an [Error::Validation] holding every invalid field, or a store
    /// error if the expense could not be saved.
    pub fn update(&self, expense: &mut Expense, form: &ExpenseForm) -> Result<(), Error> {
        let fields = form.validate(self.today())?;
        expense.apply(fields);

        self.store.save(expense)
    }

    /// The expenses the user has in a calendar month, newest first.
    ///
    /// `page` starts from 1, lower values are treated as 1. A `page_size` of
    /// zero returns every expense in the month.
    pub fn list(
        &self,
        session: &Session,
        year: i32,
        month: u8,
        page: u64,
        page_size: u64,
    ) -> Result<Vec<Expense>, Error> {
        let page = page.max(1);
        let limit = (page_size > 0).then_some(page_size);

        self.store.find_by(ExpenseQuery {
            filters: vec![
                ExpenseFilter::User(session.user_id),
                ExpenseFilter::YearMonth { year, month },
            ],
            limit,
            offset: (page - 1).saturating_mul(page_size),
        })
    }

    /// Like [ExpenseService::list], bundled with the page count and pagination controls.
    pub fn list_page(
        &self,
        session: &Session,
        year: i32,
        month: u8,
        page: u64,
        config: &PaginationConfig,
    ) -> Result<ExpensePage, Error> {
        let page = page.max(1);
        let total_count = self.count(session, year, month)?;
        let page_count = page_count(total_count, config.page_size);
        let expenses = self.list(session, year, month, page, config.page_size)?;

        Ok(ExpensePage {
            expenses,
            total_count,
            page,
            page_count,
            indicators: create_pagination_indicators(page, page_count, config.max_pages),
        })
    }

    /// How many expenses the user has in a calendar month.
    pub fn count(&self, session: &Session, year: i32, month: u8) -> Result<u64, Error> {
        self.store.count(session.user_id, year, month)
    }

    /// The years in which the user has expenses, latest first.
    pub fn list_years(&self, session: &Session) -> Result<Vec<i32>, Error> {
        self.store.list_years(session.user_id)
    }

    /// Get any expense by ID, regardless of who owns it.
    pub fn find(&self, id: ExpenseID) -> Result<Option<Expense>, Error> {
        self.store.get(id)
    }

    /// Delete any expense by ID. Deleting a missing expense is not an error.
    pub fn delete(&self, id: ExpenseID) -> Result<(), Error> {
        self.store.delete(id)
    }

    /// Get an expense that belongs to the user in `session`.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if there is no expense with `id`, or an
    /// [Error::Forbidden] if it belongs to someone else.
    pub fn get_owned(&self, session: &Session, id: ExpenseID) -> Result<Expense, Error> {
        let expense = self.store.get(id)?.ok_or(Error::NotFound)?;

        if expense.user_id != session.user_id {
            tracing::warn!(
                "User {} tried to access expense {id} owned by user {}",
                session.user_id,
                expense.user_id
            );
            return Err(Error::Forbidden);
        }

        Ok(expense)
    }

    /// Update the user's expense `id` from `form`, see [ExpenseService::update].
    pub fn edit(
        &self,
        session: &Session,
        id: ExpenseID,
        form: &ExpenseForm,
    ) -> Result<Expense, Error> {
        let mut expense = self.get_owned(session, id)?;
        self.update(&mut expense, form)?;

        Ok(expense)
    }

    /// Delete the user's expense `id`.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] or [Error::Forbidden] like [ExpenseService::get_owned].
    pub fn remove(&self, session: &Session, id: ExpenseID) -> Result<(), Error> {
        let expense = self.get_owned(session, id)?;

        self.store.delete(id)?;
        tracing::debug!("Deleted expense {id} dated {}", expense.date);

        Ok(())
    }

    /// Import the expenses in the CSV data from `reader` for the user in `session`.
    ///
    /// Rows that are invalid or already stored are skipped and counted in the
    /// returned summary. Either every valid row is stored or, if an error is
    /// returned, none of them are.
    ///
    /// # Errors
    /// Returns an [Error::ReadError] if `reader` fails, or a store error if an
    /// expense could not be checked or saved.
    pub fn import_csv<R: Read>(&self, session: &Session, reader: R) -> Result<ImportSummary, Error> {
        let today = self.today();
        let transaction = TransactionGuard::begin(&self.store)?;
        let mut summary = ImportSummary::default();

        for row in read_rows(reader, today) {
            let form = match row? {
                CsvRow::Expense(form) => form,
                CsvRow::Skip(reason) => {
                    summary.record_skip(reason);
                    continue;
                }
            };

            let fields = match form.validate(today) {
                Ok(fields) => fields,
                Err(errors) => {
                    tracing::debug!("Skipping invalid row: {errors}");
                    summary.record_skip(SkipReason::InvalidData);
                    continue;
                }
            };

            let key = ExpenseKey {
                user_id: session.user_id,
                date: fields.date,
                description: fields.description.clone(),
                category: fields.category,
                amount: fields.amount,
            };
            if self.store.find_duplicate(&key)? {
                summary.record_skip(SkipReason::Duplicate);
                continue;
            }

            self.insert(session, fields)?;
            summary.record_import();
        }

        transaction.commit()?;

        tracing::info!(
            user_id = %session.user_id,
            imported = summary.imported,
            duplicates = summary.skipped.duplicates,
            invalid_categories = summary.skipped.invalid_categories,
            invalid_data = summary.skipped.invalid_data,
            total_processed = summary.total_processed,
            "CSV import finished"
        );

        Ok(summary)
    }
}

/// An open store transaction that is rolled back when dropped unless
/// [TransactionGuard::commit] succeeded.
struct TransactionGuard<'a, S: ExpenseStore> {
    store: &'a S,
    committed: bool,
}

impl<'a, S: ExpenseStore> TransactionGuard<'a, S> {
    fn begin(store: &'a S) -> Result<Self, Error> {
        store.begin_transaction()?;

        Ok(Self {
            store,
            committed: false,
        })
    }

    fn commit(mut self) -> Result<(), Error> {
        self.store.commit()?;
        self.committed = true;

        Ok(())
    }
}

impl<S: ExpenseStore> Drop for TransactionGuard<'_, S> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        tracing::warn!("Rolling back unfinished transaction");
        if let Err(error) = self.store.roll_back() {
            tracing::error!("Could not roll back transaction: {error}");
        }
    }
}
