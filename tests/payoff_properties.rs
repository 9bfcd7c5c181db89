use payoff_core::registry::Card;
use payoff_core::simulation::{
    PayoffEngine, PayoffOutcome, PayoffPlan, Strategy, BALANCE_EPSILON,
};

fn card(nickname: &str, balance: f64, apr: f64) -> Card {
    Card::new(nickname, balance, apr).expect("valid card")
}

fn two_card_set() -> Vec<Card> {
    vec![card("A", 1000.0, 20.0), card("B", 500.0, 10.0)]
}

#[test]
fn total_interest_is_non_increasing_in_budget() {
    let cards = two_card_set();
    let mut previous = f64::INFINITY;
    for budget in [200.0, 300.0, 500.0, 800.0] {
        let report = PayoffEngine::run(&cards, &PayoffPlan::new(Strategy::Avalanche, budget))
            .expect("simulation");
        assert!(report.outcome.is_paid_off(), "budget {budget} should pay off");
        assert!(report.total_interest >= 0.0);
        assert!(
            report.total_interest <= previous + 1e-9,
            "interest should not grow with a larger budget"
        );
        previous = report.total_interest;
    }
}

#[test]
fn identical_inputs_yield_identical_reports() {
    let cards = two_card_set();
    let plan = PayoffPlan::new(Strategy::Snowball, 250.0);
    let first = PayoffEngine::run(&cards, &plan).expect("first run");
    let second = PayoffEngine::run(&cards, &plan).expect("second run");
    assert_eq!(first, second);
}

#[test]
fn avalanche_beats_snowball_when_orderings_diverge() {
    // Highest APR (A) is also the largest balance, so snowball attacks B
    // first and pays more interest overall.
    let cards = two_card_set();
    let avalanche = PayoffEngine::run(&cards, &PayoffPlan::new(Strategy::Avalanche, 200.0))
        .expect("avalanche");
    let snowball =
        PayoffEngine::run(&cards, &PayoffPlan::new(Strategy::Snowball, 200.0)).expect("snowball");
    assert!(avalanche.outcome.months() <= snowball.outcome.months());
    assert!(avalanche.total_interest <= snowball.total_interest + 1e-9);
}

#[test]
fn zero_apr_card_pays_off_in_ceil_balance_over_budget_months() {
    let cards = vec![card("NoInterest", 1000.0, 0.0)];
    let report = PayoffEngine::run(&cards, &PayoffPlan::new(Strategy::Avalanche, 400.0))
        .expect("simulation");
    assert_eq!(report.outcome, PayoffOutcome::PaidOff { months: 3 });
    assert_eq!(report.total_interest, 0.0);
    assert_eq!(report.schedule.len(), 3);
    // Final month only needs the remainder.
    assert!((report.schedule[2].payment_applied - 200.0).abs() < 1e-9);
}

#[test]
fn tiny_budget_reports_non_convergence_within_horizon() {
    let cards = vec![card("Stuck", 1000.0, 24.0)];
    let report = PayoffEngine::run(&cards, &PayoffPlan::new(Strategy::Avalanche, 0.01))
        .expect("simulation");
    match report.outcome {
        PayoffOutcome::NonConvergent { months_elapsed } => {
            assert!(months_elapsed <= 600, "month count must stay inside the horizon");
        }
        PayoffOutcome::PaidOff { .. } => panic!("a 1-cent budget cannot pay off $1000 at 24%"),
    }
}

#[test]
fn stagnation_boundary_counts_as_non_convergent() {
    // Budget exactly equal to the first month's interest: the balance
    // never strictly decreases.
    let balance = 1200.0;
    let apr = 24.0;
    let monthly_interest = balance * apr / 100.0 / 12.0;
    let cards = vec![card("Boundary", balance, apr)];
    let report = PayoffEngine::run(
        &cards,
        &PayoffPlan::new(Strategy::Avalanche, monthly_interest),
    )
    .expect("simulation");
    assert!(!report.outcome.is_paid_off());
}

#[test]
fn monthly_payment_never_exceeds_budget() {
    let budget = 200.0;
    for strategy in Strategy::ALL {
        let report = PayoffEngine::run(&two_card_set(), &PayoffPlan::new(strategy, budget))
            .expect("simulation");
        for record in &report.schedule {
            assert!(
                record.payment_applied <= budget + BALANCE_EPSILON,
                "month {} under {} overspent: {}",
                record.month,
                strategy,
                record.payment_applied
            );
        }
    }
}

#[test]
fn single_card_degenerates_across_strategies() {
    let cards = vec![card("Only", 2500.0, 19.99)];
    let reports: Vec<_> = Strategy::ALL
        .iter()
        .map(|&strategy| {
            PayoffEngine::run(&cards, &PayoffPlan::new(strategy, 300.0)).expect("simulation")
        })
        .collect();
    assert_eq!(reports[0].outcome, reports[1].outcome);
    assert_eq!(reports[1].outcome, reports[2].outcome);
    assert!((reports[0].total_interest - reports[1].total_interest).abs() < 1e-9);
    assert!((reports[1].total_interest - reports[2].total_interest).abs() < 1e-9);
}

/// Straight transcription of the stated amortization formula, used to
/// cross-check the engine's avalanche schedule end to end.
fn reference_avalanche(mut cards: Vec<(f64, f64)>, budget: f64) -> (u32, f64) {
    let mut months = 0u32;
    let mut total_interest = 0.0;
    while cards.iter().map(|c| c.0).sum::<f64>() > BALANCE_EPSILON {
        months += 1;
        for c in cards.iter_mut().filter(|c| c.0 > BALANCE_EPSILON) {
            let interest = c.0 * c.1 / 100.0 / 12.0;
            c.0 += interest;
            total_interest += interest;
        }
        let mut order: Vec<usize> = (0..cards.len())
            .filter(|&i| cards[i].0 > BALANCE_EPSILON)
            .collect();
        order.sort_by(|&a, &b| cards[b].1.total_cmp(&cards[a].1));
        let mut remaining = budget;
        for idx in order {
            if remaining <= BALANCE_EPSILON {
                break;
            }
            let pay = cards[idx].0.min(remaining);
            cards[idx].0 -= pay;
            remaining -= pay;
        }
    }
    (months, total_interest)
}

#[test]
fn avalanche_matches_hand_computed_amortization() {
    let cards = two_card_set();
    let report = PayoffEngine::run(&cards, &PayoffPlan::new(Strategy::Avalanche, 200.0))
        .expect("simulation");
    let (expected_months, expected_interest) =
        reference_avalanche(vec![(1000.0, 20.0), (500.0, 10.0)], 200.0);

    assert_eq!(report.outcome, PayoffOutcome::PaidOff { months: expected_months });
    assert!((report.total_interest - expected_interest).abs() < 1e-6);

    // First month by hand: A accrues 1000 * 20/1200, B accrues 500 * 10/1200,
    // and the whole budget hits A (highest APR).
    let first = &report.schedule[0];
    assert!((first.interest_accrued - (1000.0 * 20.0 / 1200.0 + 500.0 * 10.0 / 1200.0)).abs() < 1e-9);
    assert!((first.balances["A"] - (1000.0 + 1000.0 * 20.0 / 1200.0 - 200.0)).abs() < 1e-9);
    assert!((first.balances["B"] - (500.0 + 500.0 * 10.0 / 1200.0)).abs() < 1e-9);

    // A (higher APR) reaches zero strictly before B.
    let a_paid = report
        .schedule
        .iter()
        .find(|r| r.balances["A"] <= BALANCE_EPSILON)
        .map(|r| r.month)
        .expect("A pays off");
    let b_paid = report
        .schedule
        .iter()
        .find(|r| r.balances["B"] <= BALANCE_EPSILON)
        .map(|r| r.month)
        .expect("B pays off");
    assert!(a_paid < b_paid);
}
