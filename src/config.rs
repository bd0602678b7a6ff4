//! Application settings read from the process environment.

use std::path::PathBuf;

use time::UtcOffset;

use crate::{
    Error,
    budget::{BUDGETS_ENV_VAR, BudgetConfig},
    pagination::PaginationConfig,
    timezone::get_local_offset,
};

/// The timezone used when `TIMEZONE` is not set.
pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";

/// Settings shared by the binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path to the SQLite database file, from `DB_PATH`.
    pub db_path: PathBuf,
    /// Monthly category budgets, from `MANAGE_BUDGETS`.
    pub budgets: BudgetConfig,
    /// The canonical name of the local timezone, from `TIMEZONE`.
    pub timezone: String,
    /// The current offset of [Config::timezone].
    pub local_offset: UtcOffset,
    /// Expenses per page, from `PAGE_SIZE`.
    pub pagination: PaginationConfig,
}

impl Config {
    /// Read the settings from environment variables.
    ///
    /// # Errors
    /// Returns an [Error::MissingConfig] if `DB_PATH` is not set, or an error
    /// describing the first setting that could not be parsed.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the settings with `lookup`, which returns the value of a variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let db_path = lookup("DB_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(Error::MissingConfig("DB_PATH"))?;

        let budgets = match lookup(BUDGETS_ENV_VAR) {
            Some(json) => BudgetConfig::from_json(&json)?,
            None => BudgetConfig::default(),
        };

        let timezone = lookup("TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_owned());
        let local_offset = get_local_offset(&timezone)?;

        let mut pagination = PaginationConfig::default();
        if let Some(page_size) = lookup("PAGE_SIZE") {
            pagination.page_size = page_size.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!(
                    "PAGE_SIZE must be a non-negative integer, got \"{page_size}\""
                ))
            })?;
        }

        Ok(Self {
            db_path,
            budgets,
            timezone,
            local_offset,
            pagination,
        })
    }
}
