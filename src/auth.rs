//! Registration and log-in.
//!
//! Credential checks produce a [Session], the identity object that is passed
//! into every service call that acts on behalf of a user.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Error,
    password::{PasswordHash, ValidatedPassword},
    user::{User, UserID, create_user, get_user_by_username},
    validation::ValidationErrors,
};

/// The fewest characters a username may have.
pub const MIN_USERNAME_LENGTH: usize = 4;

/// The identity of the logged-in user making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The ID of the logged-in user.
    pub user_id: UserID,
}

impl Session {
    /// Create a session for `user_id`.
    pub fn new(user_id: UserID) -> Self {
        Self { user_id }
    }
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Self::new(user.id)
    }
}

/// Register a new user.
///
/// Both fields are trimmed. All problems with the username and the password
/// are reported together.
///
/// # Errors
/// Returns a:
/// - [Error::Validation] if the username is shorter than [MIN_USERNAME_LENGTH]
///   characters or the password does not meet the password rules,
/// - [Error::DuplicateUsername] if the username is taken,
/// - [Error::HashingError] if the password could not be hashed,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn register(
    username: &str,
    password: &str,
    hash_cost: u32,
    connection: &Connection,
) -> Result<User, Error> {
    let username = username.trim();
    let password = password.trim();

    let mut errors = ValidationErrors::new();
    if username.graphemes(true).count() < MIN_USERNAME_LENGTH {
        errors.add(
            "username",
            format!("Username must be at least {MIN_USERNAME_LENGTH} characters long."),
        );
    }
    ValidatedPassword::check(password, &mut errors);

    if let Err(errors) = errors.into_result() {
        tracing::warn!("Validation failed during registration for {username}");
        return Err(Error::Validation(errors));
    }

    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(password), hash_cost)?;
    let user = create_user(username, password_hash, connection)?;
    tracing::info!("New user registered: {username}");

    Ok(user)
}

/// Check a username and password and start a session for the matching user.
///
/// # Errors
/// Returns [Error::InvalidCredentials] if the user does not exist or the password
/// does not match, or [Error::SqlError] if there is some other SQL error.
pub fn log_in(username: &str, password: &str, connection: &Connection) -> Result<Session, Error> {
    let username = username.trim();

    let user = match get_user_by_username(username, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            tracing::warn!("Login failed for user: {username}");
            return Err(Error::InvalidCredentials);
        }
        Err(error) => return Err(error),
    };

    match user.password_hash.verify(password.trim()) {
        Ok(true) => {
            tracing::info!("User logged in: {username}");
            Ok(Session::from(&user))
        }
        Ok(false) => {
            tracing::warn!("Login failed for user: {username}");
            Err(Error::InvalidCredentials)
        }
        Err(error) => Err(Error::HashingError(error.to_string())),
    }
}
