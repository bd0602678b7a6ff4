//! Monthly spending figures for the dashboard.

use serde::Serialize;
use time::Date;

use crate::{
    Error,
    auth::Session,
    budget::{AlertGenerator, BudgetAlert},
    category::Category,
    money::Cents,
    stores::ExpenseStore,
};

/// A category's total spending and its share of the month's spending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category.
    pub category: Category,
    /// The sum of the category's expenses.
    pub total: Cents,
    /// The share of the sum of all category totals, as a percentage rounded to
    /// 2 decimal places.
    pub percentage: f64,
}

/// A category's mean expense and its share of the sum of the means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAverage {
    /// The category.
    pub category: Category,
    /// The mean expense amount in major units.
    pub average: f64,
    /// The share of the sum of all category averages, as a percentage rounded
    /// to 2 decimal places.
    pub percentage: f64,
}

/// Everything shown on the dashboard for one user and month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// The selected year.
    pub year: i32,
    /// The selected month, 1 to 12.
    pub month: u8,
    /// The sum of the month's expenses.
    pub total: Cents,
    /// Totals for the categories with expenses in the month.
    pub totals_by_category: Vec<CategoryTotal>,
    /// Averages for the categories with expenses in the month.
    pub averages_by_category: Vec<CategoryAverage>,
    /// The years the user has expenses in, latest first.
    pub years: Vec<i32>,
    /// Budget alerts, only given when the selected month is the current month.
    pub alerts: Vec<BudgetAlert>,
}

impl DashboardSummary {
    /// Gather the dashboard figures for the user in `session`.
    ///
    /// `today` decides whether the selected month is the current month.
    pub fn build<S: ExpenseStore>(
        store: &S,
        alert_generator: &AlertGenerator<'_, S>,
        session: &Session,
        year: i32,
        month: u8,
        today: Date,
    ) -> Result<Self, Error> {
        let user_id = session.user_id;

        let is_current_month = today.year() == year && u8::from(today.month()) == month;
        let alerts = if is_current_month {
            alert_generator.generate(session, year, month)?
        } else {
            Vec::new()
        };

        let totals = store.totals_by_category(user_id, year, month)?;
        let totals_sum: f64 = totals.iter().map(|(_, total)| total.as_major()).sum();
        let totals_by_category = totals
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category,
                total,
                percentage: percentage_of(total.as_major(), totals_sum),
            })
            .collect();

        let averages = store.averages_by_category(user_id, year, month)?;
        let averages_sum: f64 = averages.iter().map(|(_, average)| average).sum();
        let averages_by_category = averages
            .into_iter()
            .map(|(category, average)| CategoryAverage {
                category,
                average,
                percentage: percentage_of(average, averages_sum),
            })
            .collect();

        Ok(Self {
            year,
            month,
            total: store.total_for_month(user_id, year, month)?,
            totals_by_category,
            averages_by_category,
            years: store.list_years(user_id)?,
            alerts,
        })
    }
}

/// `value` as a percentage of `sum`, rounded to 2 decimal places. Zero when `sum` is not positive.
fn percentage_of(value: f64, sum: f64) -> f64 {
    if sum <= 0.0 {
        return 0.0;
    }

    (value / sum * 10_000.0).round() / 100.0
}
