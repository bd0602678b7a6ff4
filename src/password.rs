//! This file defines types that handle password validation and hashing.
//! `ValidatedPassword` wraps a string and ensures it meets the password rules.
//! `PasswordHash` converts a `ValidatedPassword` into a salted and hashed password.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};

use crate::{Error, validation::ValidationErrors};

/// The fewest characters a password may have.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A password that has been validated, but not yet hashed.
///
/// This struct can be used to construct a [PasswordHash].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Create and validate a new password from a string.
    ///
    /// A password must be at least [MIN_PASSWORD_LENGTH] characters long and
    /// contain at least one digit.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] with a message for the `password` field.
    pub fn new(raw_password_string: &str) -> Result<Self, Error> {
        let mut errors = ValidationErrors::new();
        Self::check(raw_password_string, &mut errors);
        errors.into_result()?;

        Ok(Self(raw_password_string.to_owned()))
    }

    /// Record any problems with `raw_password_string` under the `password` field.
    pub(crate) fn check(raw_password_string: &str, errors: &mut ValidationErrors) {
        if raw_password_string.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long."),
            );
        } else if !raw_password_string.chars().any(|c| c.is_ascii_digit()) {
            errors.add("password", "Password must contain at least one number.");
        }
    }

    /// Create a new `ValidatedPassword` without any validation.
    ///
    /// The caller should ensure that `raw_password_string` is a valid and secure password.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if an invalid password is provided it may cause incorrect behaviour but will not affect memory safety.
    pub fn new_unchecked(raw_password_string: &str) -> Self {
        Self(raw_password_string.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Create a hashed password from a validated password with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a password.
    /// Pass in [PasswordHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password could not be hashed.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Create a new `PasswordHash` without any validation.
    ///
    /// The caller should ensure that `raw_password_hash` is a valid password hash.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Check that `raw_password` matches the stored password.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod validated_password_tests {
    use crate::{Error, password::ValidatedPassword};

    fn password_error(result: Result<ValidatedPassword, Error>) -> String {
        match result {
            Err(Error::Validation(errors)) => errors
                .get("password")
                .expect("want an error for the password field")
                .to_owned(),
            other => panic!("want a validation error, got {other:?}"),
        }
    }

    #[test]
    fn new_fails_on_empty() {
        let message = password_error(ValidatedPassword::new(""));

        assert_eq!(message, "Password must be at least 8 characters long.");
    }

    #[test]
    fn new_fails_without_digit() {
        let message = password_error(ValidatedPassword::new("correcthorse"));

        assert_eq!(message, "Password must contain at least one number.");
    }

    #[test]
    fn new_succeeds_with_long_password_and_digit() {
        assert!(ValidatedPassword::new("hunter2hunter2").is_ok());
    }

    #[test]
    fn display_hides_password() {
        let password = ValidatedPassword::new_unchecked("hunter2hunter2");

        assert_eq!(password.to_string(), "********");
    }
}
