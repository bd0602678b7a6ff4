//! The fixed set of labels an expense can be filed under.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// What an expense was spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Groceries, eating out.
    Food,
    /// Fuel, fares, parking.
    Transport,
    /// Rent, mortgage, repairs.
    Housing,
    /// Power, water, internet.
    Utilities,
    /// Hobbies, going out, subscriptions.
    Entertainment,
    /// Anything else.
    Other,
}

impl Category {
    /// Every category, in the order they are presented to users.
    pub const ALL: [Category; 6] = [
        Category::Food,
        Category::Transport,
        Category::Housing,
        Category::Utilities,
        Category::Entertainment,
        Category::Other,
    ];

    /// The lowercase name used in forms, CSV files and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Housing => "housing",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }
}

/// The string did not name one of the [Category] variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid category")]
pub struct InvalidCategory(pub String);

impl FromStr for Category {
    type Err = InvalidCategory;

    /// Parse a category from its exact lowercase name.
    ///
    /// Matching is case sensitive, `"Food"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| InvalidCategory(s.to_owned()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, InvalidCategory};

    #[test]
    fn parses_every_category_name() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn rejects_unknown_names() {
        for name in ["groceries", "Food", "", " food"] {
            assert_eq!(
                name.parse::<Category>(),
                Err(InvalidCategory(name.to_owned())),
                "want {name:?} to be rejected"
            );
        }
    }
}
