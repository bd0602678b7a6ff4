//! Contains traits and implementations for objects that store the domain models.

mod expense;

pub mod sqlite;

pub use expense::{ExpenseFilter, ExpenseKey, ExpenseQuery, ExpenseStore};
