//! An expense tracker for personal finances.
//!
//! Users register, log in and record expenses in a fixed set of categories.
//! Expenses can be listed by month, imported from CSV files and summarised on
//! a dashboard that warns when a category goes over its monthly budget.
//!
//! Everything is stored in SQLite. [ExpenseService] is the entry point for
//! operations performed on behalf of a logged-in user, identified by a [Session].

#![warn(missing_docs)]

mod auth;
mod budget;
mod category;
mod config;
mod csv_import;
mod dashboard;
mod db;
mod error;
mod expense;
mod money;
mod pagination;
mod password;
mod service;
pub mod stores;
mod timezone;
mod user;
mod validation;

#[cfg(test)]
mod test_utils;

pub use auth::{MIN_USERNAME_LENGTH, Session, log_in, register};
pub use budget::{AlertGenerator, BUDGETS_ENV_VAR, BudgetAlert, BudgetConfig};
pub use category::{Category, InvalidCategory};
pub use config::{Config, DEFAULT_TIMEZONE};
pub use csv_import::{ImportSummary, SkippedRows};
pub use dashboard::{CategoryAverage, CategoryTotal, DashboardSummary};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::{DATE_FORMAT, Expense, ExpenseFields, ExpenseForm, ExpenseID};
pub use money::{Cents, ParseAmountError};
pub use pagination::{PaginationConfig, PaginationIndicator};
pub use password::{MIN_PASSWORD_LENGTH, PasswordHash, ValidatedPassword};
pub use service::{ExpensePage, ExpenseService};
pub use timezone::get_local_offset;
pub use user::{User, UserID, count_users, create_user, get_user_by_id, get_user_by_username};
pub use validation::ValidationErrors;
