//! Monthly category budgets and the alerts raised when spending goes over them.

use std::fmt::Display;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    Error, auth::Session, category::Category, money::Cents, stores::ExpenseStore,
};

/// The environment variable holding the budgets as a JSON object, e.g.
/// `{"food": 150, "transport": 60.5}`.
pub const BUDGETS_ENV_VAR: &str = "MANAGE_BUDGETS";

/// The monthly spending limit for each budgeted category.
///
/// Budgets keep the order they were configured in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetConfig {
    budgets: Vec<(Category, Cents)>,
}

impl BudgetConfig {
    /// Parse budgets from a JSON object mapping category names to amounts.
    ///
    /// Names that are not categories are ignored with a warning.
    ///
    /// # Errors
    /// Returns an [Error::InvalidBudgetConfig] if `json` is not an object, or
    /// any amount is not a number or is negative.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let object: Map<String, Value> = serde_json::from_str(json)
            .map_err(|error| Error::InvalidBudgetConfig(error.to_string()))?;

        let mut budgets = Vec::with_capacity(object.len());

        for (name, value) in object {
            let Ok(category) = name.parse::<Category>() else {
                tracing::warn!("Ignoring budget for unknown category \"{name}\"");
                continue;
            };

            let Value::Number(number) = value else {
                return Err(Error::InvalidBudgetConfig(format!(
                    "the budget for {name} must be a number, got {value}"
                )));
            };

            // Parse the decimal text where possible so that amounts round
            // the same way as user input.
            let amount = match Cents::parse(&number.to_string()) {
                Ok(amount) => amount,
                Err(_) => Cents::from_f64(number.as_f64().unwrap_or(f64::NAN)),
            };

            if amount < Cents::ZERO || number.as_f64().is_some_and(f64::is_sign_negative) {
                return Err(Error::InvalidBudgetConfig(format!(
                    "the budget for {name} cannot be negative, got {number}"
                )));
            }

            budgets.push((category, amount));
        }

        Ok(Self { budgets })
    }

    /// The budget for `category`, if it has one.
    pub fn get(&self, category: Category) -> Option<Cents> {
        self.budgets
            .iter()
            .find(|(budgeted, _)| *budgeted == category)
            .map(|(_, amount)| *amount)
    }

    /// Iterate over the budgets in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, Cents)> + '_ {
        self.budgets.iter().copied()
    }

    /// Whether no category has a budget.
    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }
}

/// A category whose spending went over its budget in a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetAlert {
    /// The category that went over budget.
    pub category: Category,
    /// The configured budget.
    pub budget: Cents,
    /// The total spent in the month.
    pub spent: Cents,
    /// How much more than the budget was spent.
    pub overage: Cents,
}

impl Display for BudgetAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "⚠ {} budget exceeded by {} €",
            self.category, self.overage
        )
    }
}

/// Compares monthly spending against the configured budgets.
#[derive(Debug)]
pub struct AlertGenerator<'a, S> {
    store: &'a S,
    budgets: &'a BudgetConfig,
}

impl<'a, S: ExpenseStore> AlertGenerator<'a, S> {
    /// Create an alert generator that reads totals from `store`.
    pub fn new(store: &'a S, budgets: &'a BudgetConfig) -> Self {
        Self { store, budgets }
    }

    /// The alerts for the user's spending in a calendar month, in the order
    /// the budgets were configured.
    ///
    /// A category without expenses counts as zero spent. Spending exactly
    /// the budget does not raise an alert.
    pub fn generate(
        &self,
        session: &Session,
        year: i32,
        month: u8,
    ) -> Result<Vec<BudgetAlert>, Error> {
        if self.budgets.is_empty() {
            return Ok(Vec::new());
        }

        let totals = self
            .store
            .totals_by_category(session.user_id, year, month)?;

        let alerts = self
            .budgets
            .iter()
            .filter_map(|(category, budget)| {
                let spent = totals
                    .iter()
                    .find(|(total_category, _)| *total_category == category)
                    .map_or(Cents::ZERO, |(_, total)| *total);

                (spent > budget).then(|| BudgetAlert {
                    category,
                    budget,
                    spent,
                    overage: spent - budget,
                })
            })
            .collect();

        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        auth::Session,
        category::Category,
        money::Cents,
        stores::ExpenseStore,
        test_utils::{TestDb, expense},
    };

    use super::{AlertGenerator, BudgetAlert, BudgetConfig};

    #[test]
    fn parses_budgets_in_configured_order() {
        let config =
            BudgetConfig::from_json(r#"{"transport": 60.5, "food": 150, "other": 0.125}"#)
                .unwrap();

        assert_eq!(
            config.iter().collect::<Vec<_>>(),
            vec![
                (Category::Transport, Cents::new(6050)),
                (Category::Food, Cents::new(15000)),
                (Category::Other, Cents::new(13)),
            ]
        );
        assert_eq!(config.get(Category::Food), Some(Cents::new(15000)));
        assert_eq!(config.get(Category::Housing), None);
    }

    #[test]
    fn skips_unknown_categories() {
        let config = BudgetConfig::from_json(r#"{"groceries": 100, "food": 1}"#).unwrap();

        assert_eq!(
            config.iter().collect::<Vec<_>>(),
            vec![(Category::Food, Cents::new(100))]
        );
    }

    #[test]
    fn empty_object_has_no_budgets() {
        assert!(BudgetConfig::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn rejects_invalid_budgets() {
        for json in [
            r#"{"food": "lots"}"#,
            r#"{"food": -1}"#,
            r#"{"food": null}"#,
            r#"[150]"#,
            "not json",
        ] {
            let result = BudgetConfig::from_json(json);
            assert!(
                matches!(result, Err(Error::InvalidBudgetConfig(_))),
                "want {json} to be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn alert_message_shows_overage() {
        let alert = BudgetAlert {
            category: Category::Food,
            budget: Cents::new(1500),
            spent: Cents::new(2010),
            overage: Cents::new(510),
        };

        assert_eq!(alert.to_string(), "⚠ food budget exceeded by 5.10 €");
    }

    #[test]
    fn alerts_only_for_categories_over_budget() {
        let db = TestDb::new();
        for mut expense in [
            expense(db.alice, date!(2024 - 01 - 05), Category::Food, 1250, "Lunch"),
            expense(db.alice, date!(2024 - 01 - 20), Category::Food, 760, "Snacks"),
            expense(db.alice, date!(2024 - 01 - 21), Category::Transport, 1000, "Bus"),
            expense(db.alice, date!(2024 - 02 - 01), Category::Food, 9900, "Feast"),
            expense(db.bob, date!(2024 - 01 - 05), Category::Housing, 90000, "Rent"),
        ] {
            db.store.save(&mut expense).unwrap();
        }
        let budgets = BudgetConfig::from_json(
            r#"{"housing": 500, "food": 15, "transport": 10, "utilities": 0}"#,
        )
        .unwrap();

        let alerts = AlertGenerator::new(&db.store, &budgets)
            .generate(&Session::new(db.alice), 2024, 1)
            .unwrap();

        assert_eq!(
            alerts,
            vec![BudgetAlert {
                category: Category::Food,
                budget: Cents::new(1500),
                spent: Cents::new(2010),
                overage: Cents::new(510),
            }]
        );
        assert_eq!(alerts[0].to_string(), "⚠ food budget exceeded by 5.10 €");
    }

    #[test]
    fn no_budgets_means_no_alerts() {
        let db = TestDb::new();
        db.store
            .save(&mut expense(db.alice, date!(2024 - 01 - 05), Category::Food, 1250, "Lunch"))
            .unwrap();

        let alerts = AlertGenerator::new(&db.store, &BudgetConfig::default())
            .generate(&Session::new(db.alice), 2024, 1)
            .unwrap();

        assert!(alerts.is_empty());
    }
}
