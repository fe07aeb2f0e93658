//! CTC breakdown calculator
//!
//! Splits a record's compensation into named components for the detail
//! panel. Real base/bonus/stock figures are used when a base salary is
//! known; otherwise a 70/20/10 estimate is derived from the total.

use serde::{Deserialize, Serialize};

use super::currency::format_inr_compact;
use super::view::PayFigures;

const ESTIMATED_BASE_SHARE: f64 = 0.7;
const ESTIMATED_HRA_SHARE: f64 = 0.2;

/// One named slice of the total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownComponent {
    pub name: String,
    pub amount: f64,
    pub percentage: i64,
}

impl BreakdownComponent {
    fn new(name: &str, amount: f64, percentage: i64) -> Self {
        Self {
            name: name.to_string(),
            amount,
            percentage,
        }
    }
}

/// Derived, display-only breakdown of a record's compensation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationBreakdown {
    pub total: f64,
    pub components: Vec<BreakdownComponent>,
}

/// Percentage of `part` in `total`, rounded to the nearest integer
fn share_of(part: f64, total: f64) -> i64 {
    if total > 0.0 {
        (part / total * 100.0).round() as i64
    } else {
        0
    }
}

impl CompensationBreakdown {
    /// Compute the breakdown for a resolved set of pay figures
    pub fn from_figures(figures: &PayFigures) -> Self {
        match *figures {
            PayFigures::Stipend { stipend_avg } => Self {
                total: stipend_avg,
                components: vec![BreakdownComponent::new("Monthly Stipend", stipend_avg, 100)],
            },
            PayFigures::Salary {
                total_compensation,
                avg_salary,
                base_salary,
                bonus,
                stock_compensation,
            } => {
                let total = total_compensation
                    .filter(|t| *t != 0.0)
                    .or(avg_salary)
                    .unwrap_or(0.0);
                let base = base_salary.unwrap_or(0.0);

                if base > 0.0 {
                    let components = [
                        ("Base Salary", base),
                        ("Bonus", bonus.unwrap_or(0.0)),
                        ("Stock", stock_compensation.unwrap_or(0.0)),
                    ]
                    .into_iter()
                    .filter(|(_, amount)| *amount > 0.0)
                    .map(|(name, amount)| {
                        BreakdownComponent::new(name, amount, share_of(amount, total))
                    })
                    .collect();

                    return Self { total, components };
                }

                Self::estimated(total)
            }
        }
    }

    /// Synthetic 70/20/10 split whose parts always sum to `total`
    pub fn estimated(total: f64) -> Self {
        let base = (total * ESTIMATED_BASE_SHARE).round();
        let hra = (total * ESTIMATED_HRA_SHARE).round();
        let other = total - base - hra;

        Self {
            total,
            components: vec![
                BreakdownComponent::new("Base Salary", base, 70),
                BreakdownComponent::new("HRA", hra, 20),
                BreakdownComponent::new("Other Allowances", other, 10),
            ],
        }
    }

    /// Sum of the listed component amounts
    pub fn components_sum(&self) -> f64 {
        self.components.iter().map(|c| c.amount).sum()
    }

    /// Compact INR labels for each component followed by the total
    pub fn labels(&self) -> BreakdownLabels {
        BreakdownLabels {
            components: self
                .components
                .iter()
                .map(|c| format_inr_compact(c.amount))
                .collect(),
            total: format_inr_compact(self.total),
        }
    }
}

/// Display strings matching a breakdown's components
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownLabels {
    pub components: Vec<String>,
    pub total: String,
}

/// Compute a breakdown; `None` only when there is no record to break down
pub fn calculate_breakdown(figures: Option<&PayFigures>) -> Option<CompensationBreakdown> {
    figures.map(CompensationBreakdown::from_figures)
}
