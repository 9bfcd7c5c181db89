use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::errors::{PayoffError, Result};
use crate::registry::Card;

use super::{
    monthly_rate, BudgetComparison, ManualPlan, ManualReport, MonthlyRecord, PayoffOutcome,
    PayoffPlan, PayoffReport, Strategy, BALANCE_EPSILON,
};

/// Stateless simulator. Each run operates on a cloned snapshot of the
/// card list, so identical inputs always produce identical schedules.
pub struct PayoffEngine;

impl PayoffEngine {
    /// Simulates paying off all cards from a single total monthly budget.
    ///
    /// Terminates when every balance reaches zero, or reports
    /// [`PayoffOutcome::NonConvergent`] as soon as a month ends without
    /// the total balance strictly decreasing, or when the plan's horizon
    /// is reached. The month count never exceeds the horizon.
    pub fn run(cards: &[Card], plan: &PayoffPlan) -> Result<PayoffReport> {
        if !plan.monthly_budget.is_finite() || plan.monthly_budget <= 0.0 {
            return Err(PayoffError::InvalidInput(
                "monthly budget must be greater than zero".into(),
            ));
        }

        let mut working: Vec<Card> = cards.iter().filter(|c| c.is_active()).cloned().collect();
        let starting_balance: f64 = working.iter().map(|c| c.balance).sum();

        let mut schedule = Vec::new();
        let mut total_interest = 0.0;
        let mut month = 0u32;

        while total_balance(&working) > BALANCE_EPSILON {
            if month >= plan.horizon_months {
                warn!(
                    budget = plan.monthly_budget,
                    horizon = plan.horizon_months,
                    "plan hit the simulation horizon without paying off"
                );
                return Ok(report(
                    plan,
                    starting_balance,
                    PayoffOutcome::NonConvergent {
                        months_elapsed: month,
                    },
                    total_interest,
                    schedule,
                ));
            }
            month += 1;
            let opening = total_balance(&working);

            let interest_accrued = accrue_interest(&mut working);
            total_interest += interest_accrued;

            let payment_applied = match plan.strategy {
                Strategy::Proportional => allocate_proportional(&mut working, plan.monthly_budget),
                Strategy::Avalanche | Strategy::Snowball => {
                    allocate_cascade(&mut working, plan.strategy, plan.monthly_budget)
                }
            };

            let closing = total_balance(&working);
            schedule.push(snapshot(month, interest_accrued, payment_applied, &working));

            if closing > BALANCE_EPSILON && closing + BALANCE_EPSILON >= opening {
                // Balances are stagnant or growing; a longer horizon would
                // only inflate the month count.
                warn!(
                    budget = plan.monthly_budget,
                    month, "balances did not shrink, declaring non-convergence"
                );
                return Ok(report(
                    plan,
                    starting_balance,
                    PayoffOutcome::NonConvergent {
                        months_elapsed: month,
                    },
                    total_interest,
                    schedule,
                ));
            }
        }

        debug!(
            budget = plan.monthly_budget,
            months = month,
            total_interest,
            "plan paid off"
        );
        Ok(report(
            plan,
            starting_balance,
            PayoffOutcome::PaidOff { months: month },
            total_interest,
            schedule,
        ))
    }

    /// Simulates a fixed manual payment per card each month. Overpaying a
    /// card does not roll the excess over to other cards.
    pub fn run_manual(cards: &[Card], plan: &ManualPlan) -> Result<ManualReport> {
        for (nickname, amount) in &plan.payments {
            if !amount.is_finite() || *amount < 0.0 {
                return Err(PayoffError::InvalidInput(format!(
                    "payment for `{}` must be zero or positive",
                    nickname
                )));
            }
            if !cards
                .iter()
                .any(|c| c.nickname.eq_ignore_ascii_case(nickname))
            {
                return Err(PayoffError::CardNotFound(nickname.clone()));
            }
        }

        let mut working: Vec<Card> = cards.iter().filter(|c| c.is_active()).cloned().collect();
        let starting_balance: f64 = working.iter().map(|c| c.balance).sum();

        let mut schedule = Vec::new();
        let mut total_interest = 0.0;
        let mut month = 0u32;

        while total_balance(&working) > BALANCE_EPSILON {
            if month >= plan.horizon_months {
                return Ok(ManualReport {
                    starting_balance,
                    outcome: PayoffOutcome::NonConvergent {
                        months_elapsed: month,
                    },
                    total_interest,
                    schedule,
                });
            }
            month += 1;
            let opening = total_balance(&working);

            let interest_accrued = accrue_interest(&mut working);
            total_interest += interest_accrued;

            let mut payment_applied = 0.0;
            for card in working.iter_mut().filter(|c| c.is_active()) {
                let amount = plan
                    .payments
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(&card.nickname))
                    .map(|(_, amount)| *amount)
                    .unwrap_or(0.0);
                let pay = amount.min(card.balance);
                card.balance -= pay;
                payment_applied += pay;
            }

            let closing = total_balance(&working);
            schedule.push(snapshot(month, interest_accrued, payment_applied, &working));

            if closing > BALANCE_EPSILON && closing + BALANCE_EPSILON >= opening {
                return Ok(ManualReport {
                    starting_balance,
                    outcome: PayoffOutcome::NonConvergent {
                        months_elapsed: month,
                    },
                    total_interest,
                    schedule,
                });
            }
        }

        Ok(ManualReport {
            starting_balance,
            outcome: PayoffOutcome::PaidOff { months: month },
            total_interest,
            schedule,
        })
    }

    /// Runs one simulation per budget and collapses each into a summary row.
    pub fn compare_budgets(
        cards: &[Card],
        budgets: &[f64],
        strategy: Strategy,
        horizon_months: u32,
    ) -> Result<Vec<BudgetComparison>> {
        let mut rows = Vec::with_capacity(budgets.len());
        for &budget in budgets {
            let plan = PayoffPlan::new(strategy, budget).with_horizon(horizon_months);
            let result = Self::run(cards, &plan)?;
            rows.push(BudgetComparison {
                monthly_budget: budget,
                outcome: result.outcome,
                total_interest: result.total_interest,
                total_paid: result.total_paid(),
            });
        }
        Ok(rows)
    }
}

fn total_balance(cards: &[Card]) -> f64 {
    cards.iter().map(|c| c.balance).sum()
}

fn accrue_interest(cards: &mut [Card]) -> f64 {
    let mut accrued = 0.0;
    for card in cards.iter_mut().filter(|c| c.is_active()) {
        let interest = card.balance * monthly_rate(card.apr);
        card.balance += interest;
        accrued += interest;
    }
    accrued
}

/// Pays cards in priority order until the budget runs out. One ordered
/// pass covers every active card, so a paid-off card's leftover budget
/// cascades to the next in line within the same month.
fn allocate_cascade(cards: &mut [Card], strategy: Strategy, budget: f64) -> f64 {
    let mut order: Vec<usize> = (0..cards.len()).filter(|&i| cards[i].is_active()).collect();
    match strategy {
        Strategy::Avalanche => order.sort_by(|&a, &b| {
            cards[b]
                .apr
                .total_cmp(&cards[a].apr)
                .then(cards[a].balance.total_cmp(&cards[b].balance))
        }),
        Strategy::Snowball => order.sort_by(|&a, &b| {
            cards[a]
                .balance
                .total_cmp(&cards[b].balance)
                .then(cards[b].apr.total_cmp(&cards[a].apr))
        }),
        Strategy::Proportional => unreachable!("proportional allocation has no cascade"),
    }

    let mut remaining = budget;
    let mut paid = 0.0;
    for index in order {
        if remaining <= BALANCE_EPSILON {
            break;
        }
        let pay = cards[index].balance.min(remaining);
        cards[index].balance -= pay;
        remaining -= pay;
        paid += pay;
    }
    paid
}

/// Splits the budget across active cards in proportion to their share of
/// the total balance. Shares are computed against a snapshot so payments
/// earlier in the loop do not skew later proportions. No cascade: a card
/// whose share exceeds its balance leaves that excess unspent.
fn allocate_proportional(cards: &mut [Card], budget: f64) -> f64 {
    let active_total: f64 = cards.iter().filter(|c| c.is_active()).map(|c| c.balance).sum();
    if active_total <= BALANCE_EPSILON {
        return 0.0;
    }
    let shares: Vec<f64> = cards
        .iter()
        .map(|c| {
            if c.is_active() {
                budget * (c.balance / active_total)
            } else {
                0.0
            }
        })
        .collect();

    let mut paid = 0.0;
    for (card, share) in cards.iter_mut().zip(shares) {
        let pay = card.balance.min(share);
        card.balance -= pay;
        paid += pay;
    }
    paid
}

fn snapshot(month: u32, interest_accrued: f64, payment_applied: f64, cards: &[Card]) -> MonthlyRecord {
    let balances: BTreeMap<String, f64> = cards
        .iter()
        .map(|c| (c.nickname.clone(), c.balance.max(0.0)))
        .collect();
    let total = balances.values().sum();
    MonthlyRecord {
        month,
        interest_accrued,
        payment_applied,
        balances,
        total_balance: total,
    }
}

fn report(
    plan: &PayoffPlan,
    starting_balance: f64,
    outcome: PayoffOutcome,
    total_interest: f64,
    schedule: Vec<MonthlyRecord>,
) -> PayoffReport {
    PayoffReport {
        strategy: plan.strategy,
        monthly_budget: plan.monthly_budget,
        starting_balance,
        outcome,
        total_interest,
        schedule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(nickname: &str, balance: f64, apr: f64) -> Card {
        Card::new(nickname, balance, apr).expect("valid card")
    }

    #[test]
    fn empty_card_set_pays_off_in_zero_months() {
        let report = PayoffEngine::run(&[], &PayoffPlan::new(Strategy::Avalanche, 500.0))
            .expect("simulation");
        assert_eq!(report.outcome, PayoffOutcome::PaidOff { months: 0 });
        assert!(report.schedule.is_empty());
        assert_eq!(report.total_interest, 0.0);
    }

    #[test]
    fn zero_balance_cards_are_excluded() {
        let cards = vec![card("Paid", 0.0, 29.99), card("Open", 100.0, 0.0)];
        let report = PayoffEngine::run(&cards, &PayoffPlan::new(Strategy::Snowball, 100.0))
            .expect("simulation");
        assert_eq!(report.outcome, PayoffOutcome::PaidOff { months: 1 });
        assert!(report.schedule[0].balances.contains_key("Open"));
        assert!(!report.schedule[0].balances.contains_key("Paid"));
    }

    #[test]
    fn rejects_non_positive_budget() {
        let cards = vec![card("A", 100.0, 10.0)];
        let err = PayoffEngine::run(&cards, &PayoffPlan::new(Strategy::Avalanche, 0.0)).unwrap_err();
        assert!(matches!(err, PayoffError::InvalidInput(_)));
    }

    #[test]
    fn proportional_splits_by_balance_share() {
        let cards = vec![card("A", 750.0, 0.0), card("B", 250.0, 0.0)];
        let report = PayoffEngine::run(&cards, &PayoffPlan::new(Strategy::Proportional, 100.0))
            .expect("simulation");
        let first = &report.schedule[0];
        assert!((first.balances["A"] - 675.0).abs() < 1e-9);
        assert!((first.balances["B"] - 225.0).abs() < 1e-9);
    }

    #[test]
    fn cascade_rolls_leftover_budget_to_next_card() {
        let cards = vec![card("Small", 50.0, 30.0), card("Big", 500.0, 10.0)];
        let report = PayoffEngine::run(&cards, &PayoffPlan::new(Strategy::Avalanche, 200.0))
            .expect("simulation");
        let first = &report.schedule[0];
        // Small (higher APR) absorbs its payoff, the rest hits Big.
        assert_eq!(first.balances["Small"], 0.0);
        assert!(first.balances["Big"] < 500.0 * (1.0 + monthly_rate(10.0)));
        assert!(first.payment_applied <= 200.0 + BALANCE_EPSILON);
    }

    #[test]
    fn manual_overpayment_does_not_roll_over() {
        let cards = vec![card("A", 100.0, 0.0), card("B", 300.0, 0.0)];
        let mut payments = BTreeMap::new();
        payments.insert("A".to_string(), 500.0);
        payments.insert("B".to_string(), 100.0);
        let report = PayoffEngine::run_manual(&cards, &ManualPlan::new(payments)).expect("manual");
        let first = &report.schedule[0];
        assert_eq!(first.balances["A"], 0.0);
        assert_eq!(first.balances["B"], 200.0);
        // 100 to A plus 100 to B, the 400 overpayment is discarded.
        assert!((first.payment_applied - 200.0).abs() < 1e-9);
    }

    #[test]
    fn manual_plan_rejects_unknown_card() {
        let cards = vec![card("A", 100.0, 0.0)];
        let mut payments = BTreeMap::new();
        payments.insert("Ghost".to_string(), 50.0);
        let err = PayoffEngine::run_manual(&cards, &ManualPlan::new(payments)).unwrap_err();
        assert!(matches!(err, PayoffError::CardNotFound(_)));
    }
}
