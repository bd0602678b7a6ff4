//! The expense model and the validation of user submitted expense data.

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{category::Category, money::Cents, user::UserID, validation::ValidationErrors};

/// Alias for the integer type used for expense IDs in the database.
pub type ExpenseID = i64;

/// The date format used in forms, CSV files and the database.
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Money spent by a user on one thing.
///
/// An expense without an `id` has not been saved yet, the store assigns one on
/// the first save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense, `None` until it is first saved.
    pub id: Option<ExpenseID>,
    /// The user who spent the money.
    pub user_id: UserID,
    /// The day the money was spent.
    pub date: Date,
    /// What the money was spent on.
    pub category: Category,
    /// How much was spent, always greater than zero.
    pub amount: Cents,
    /// A text description of what the expense was for, never empty.
    pub description: String,
}

impl Expense {
    /// Create an unsaved expense from validated fields.
    pub fn new(user_id: UserID, fields: ExpenseFields) -> Self {
        Self {
            id: None,
            user_id,
            date: fields.date,
            category: fields.category,
            amount: fields.amount,
            description: fields.description,
        }
    }

    /// Overwrite the editable fields, keeping the ID and owner.
    pub fn apply(&mut self, fields: ExpenseFields) {
        self.date = fields.date;
        self.category = fields.category;
        self.amount = fields.amount;
        self.description = fields.description;
    }
}

/// The raw form data for creating or editing an expense.
///
/// Fields are kept as the user typed them so that they can be echoed back
/// alongside any validation errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseForm {
    /// The date formatted as `YYYY-MM-DD`.
    pub date: String,
    /// The lowercase category name.
    pub category: String,
    /// The amount as a decimal number, e.g. `12.50`.
    pub amount: String,
    /// Text detailing the expense.
    pub description: String,
}

/// Expense data that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFields {
    /// A date no later than today.
    pub date: Date,
    /// One of the fixed categories.
    pub category: Category,
    /// A positive amount, rounded to the nearest cent.
    pub amount: Cents,
    /// The description with surrounding whitespace removed.
    pub description: String,
}

impl ExpenseForm {
    /// Check every field and convert the form into [ExpenseFields].
    ///
    /// `today` is the latest allowed date, inclusive.
    ///
    /// # Errors
    /// Returns every problem found, keyed by field name (`date`, `category`,
    /// `amount`, `description`).
    pub fn validate(&self, today: Date) -> Result<ExpenseFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let date = match Date::parse(self.date.trim(), DATE_FORMAT) {
            Ok(date) if date > today => {
                errors.add("date", "Date must be today or earlier.");
                None
            }
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("date", "Date must be in the format YYYY-MM-DD.");
                None
            }
        };

        let category = match self.category.trim().parse::<Category>() {
            Ok(category) => Some(category),
            Err(_) => {
                errors.add("category", "Please select a valid category.");
                None
            }
        };

        let amount = match Cents::parse(&self.amount) {
            Ok(amount) if amount > Cents::ZERO => Some(amount),
            _ => {
                errors.add("amount", "Amount must be a positive number.");
                None
            }
        };

        let description = self.description.trim();
        if description.is_empty() {
            errors.add("description", "Description cannot be empty.");
        }

        match (date, category, amount) {
            (Some(date), Some(category), Some(amount)) if errors.is_empty() => Ok(ExpenseFields {
                date,
                category,
                amount,
                description: description.to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Expense> for ExpenseForm {
    fn from(expense: &Expense) -> Self {
        Self {
            date: expense.date.to_string(),
            category: expense.category.to_string(),
            amount: expense.amount.to_string(),
            description: expense.description.clone(),
        }
    }
}
