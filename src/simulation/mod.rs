//! Payoff simulation types and engine.

mod engine;

pub use engine::PayoffEngine;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::PayoffError;

/// Balances at or below this threshold count as paid off.
pub const BALANCE_EPSILON: f64 = 1e-6;

/// Default simulation horizon before a plan is declared non-convergent.
pub const DEFAULT_HORIZON_MONTHS: u32 = 600;

/// Monthly periodic rate for an APR given in percent (e.g. 24.49).
pub fn monthly_rate(apr_percent: f64) -> f64 {
    apr_percent / 100.0 / 12.0
}

/// Repayment strategy for allocating the monthly budget across cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Avalanche,
    Snowball,
    Proportional,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::Avalanche,
        Strategy::Snowball,
        Strategy::Proportional,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Avalanche => "Avalanche (highest APR first)",
            Strategy::Snowball => "Snowball (smallest balance first)",
            Strategy::Proportional => "Proportional (split by balance)",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            Strategy::Avalanche => {
                "Puts extra money toward the highest APR card first. Usually minimizes total interest."
            }
            Strategy::Snowball => {
                "Pays off the smallest balance first. Often feels motivating; may cost more interest."
            }
            Strategy::Proportional => {
                "Splits the monthly budget across cards in proportion to their balances."
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Avalanche => "avalanche",
            Strategy::Snowball => "snowball",
            Strategy::Proportional => "proportional",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Strategy {
    type Err = PayoffError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "avalanche" => Ok(Strategy::Avalanche),
            "snowball" => Ok(Strategy::Snowball),
            "proportional" => Ok(Strategy::Proportional),
            other => Err(PayoffError::InvalidInput(format!(
                "strategy must be one of avalanche, snowball, proportional (got `{}`)",
                other
            ))),
        }
    }
}

/// Immutable description of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffPlan {
    pub strategy: Strategy,
    pub monthly_budget: f64,
    pub horizon_months: u32,
}

impl PayoffPlan {
    pub fn new(strategy: Strategy, monthly_budget: f64) -> Self {
        Self {
            strategy,
            monthly_budget,
            horizon_months: DEFAULT_HORIZON_MONTHS,
        }
    }

    pub fn with_horizon(mut self, horizon_months: u32) -> Self {
        self.horizon_months = horizon_months;
        self
    }
}

/// Fixed per-card payments applied every month, with no rollover of
/// overpayment to other cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualPlan {
    pub payments: BTreeMap<String, f64>,
    pub horizon_months: u32,
}

impl ManualPlan {
    pub fn new(payments: BTreeMap<String, f64>) -> Self {
        Self {
            payments,
            horizon_months: DEFAULT_HORIZON_MONTHS,
        }
    }
}

/// One elapsed month of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// 1-based month index.
    pub month: u32,
    pub interest_accrued: f64,
    pub payment_applied: f64,
    /// Remaining balance per card after this month's payment.
    pub balances: BTreeMap<String, f64>,
    pub total_balance: f64,
}

/// Terminal state of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayoffOutcome {
    PaidOff { months: u32 },
    /// The budget never shrank the total balance, or the horizon was hit.
    /// `months_elapsed` never exceeds the plan's horizon.
    NonConvergent { months_elapsed: u32 },
}

impl PayoffOutcome {
    pub fn is_paid_off(&self) -> bool {
        matches!(self, PayoffOutcome::PaidOff { .. })
    }

    pub fn months(&self) -> u32 {
        match self {
            PayoffOutcome::PaidOff { months } => *months,
            PayoffOutcome::NonConvergent { months_elapsed } => *months_elapsed,
        }
    }
}

/// Full result of one budget-driven simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffReport {
    pub strategy: Strategy,
    pub monthly_budget: f64,
    pub starting_balance: f64,
    pub outcome: PayoffOutcome,
    pub total_interest: f64,
    pub schedule: Vec<MonthlyRecord>,
}

impl PayoffReport {
    /// Principal plus interest, defined only for plans that pay off.
    pub fn total_paid(&self) -> Option<f64> {
        self.outcome
            .is_paid_off()
            .then(|| self.starting_balance + self.total_interest)
    }
}

/// Result of a manual per-card payment simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualReport {
    pub starting_balance: f64,
    pub outcome: PayoffOutcome,
    pub total_interest: f64,
    pub schedule: Vec<MonthlyRecord>,
}

/// One row of the budget comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub monthly_budget: f64,
    pub outcome: PayoffOutcome,
    pub total_interest: f64,
    pub total_paid: Option<f64>,
}
