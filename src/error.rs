//! Defines the crate level error type and the messages shown to users for each error.

use crate::validation::ValidationErrors;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The submitted input failed validation.
    ///
    /// The caller should re-render the form with the original input and the
    /// messages for each field.
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),

    /// The requested resource was not found.
    ///
    /// Callers should check that the ID is correct and that the resource has
    /// been created. This error is never retried.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The resource exists but belongs to another user.
    #[error("the requested resource belongs to another user")]
    Forbidden,

    /// The username is already taken by a registered user.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// The username and password combination did not match a registered user.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A transaction was started while another one is still open.
    ///
    /// Store transactions do not nest.
    #[error("a database transaction is already in progress")]
    TransactionAlreadyActive,

    /// Tried to commit or roll back without an open transaction.
    #[error("there is no database transaction in progress")]
    NoActiveTransaction,

    /// The uploaded file could not be read.
    #[error("could not read the uploaded file: {0}")]
    ReadError(String),

    /// The category budgets in the configuration could not be parsed.
    #[error("invalid budget configuration: {0}")]
    InvalidBudgetConfig(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A required setting is missing from the environment.
    #[error("the environment variable '{0}' must be set")]
    MissingConfig(&'static str),

    /// A setting in the environment has an invalid value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername(String::new())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

impl Error {
    /// A message that is safe to show to the user who triggered the error.
    ///
    /// Errors that are not the user's fault are collapsed into a generic message,
    /// the details should be logged instead.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(errors) => errors.to_string(),
            Error::NotFound => "The expense could not be found.".to_owned(),
            Error::Forbidden => "You do not have access to this expense.".to_owned(),
            Error::DuplicateUsername(_) => {
                "That username is taken, choose a different one.".to_owned()
            }
            Error::InvalidCredentials => "Username or password incorrect.".to_owned(),
            Error::ReadError(_) => "The uploaded file could not be read.".to_owned(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                "Failed to save expense. Please try again.".to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::validation::ValidationErrors;

    use super::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(Error::from(rusqlite::Error::QueryReturnedNoRows), Error::NotFound);
    }

    #[test]
    fn unique_username_violation_maps_to_duplicate_username() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE user (username TEXT UNIQUE)", ())
            .unwrap();
        conn.execute("INSERT INTO user (username) VALUES ('alice')", ())
            .unwrap();

        let error = conn
            .execute("INSERT INTO user (username) VALUES ('alice')", ())
            .unwrap_err();

        assert!(matches!(Error::from(error), Error::DuplicateUsername(_)));
    }

    #[test]
    fn persistence_errors_get_a_generic_message() {
        let error = Error::SqlError(rusqlite::Error::InvalidQuery);

        assert_eq!(
            error.user_message(),
            "Failed to save expense. Please try again."
        );
    }

    #[test]
    fn validation_errors_list_every_field() {
        let mut errors = ValidationErrors::new();
        errors.add("amount", "Amount must be a positive number.");
        errors.add("date", "Date must be today or earlier.");

        assert_eq!(
            Error::Validation(errors).user_message(),
            "amount: Amount must be a positive number.; date: Date must be today or earlier."
        );
    }
}
