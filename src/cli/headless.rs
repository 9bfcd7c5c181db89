//! One-shot, non-interactive runs for scripting:
//!
//! ```text
//! payoff_cli simulate --cards cards.json --budget 800 --budget 1000 \
//!     [--strategy avalanche] [--horizon 600] [--schedule]
//! ```
//!
//! The cards file is a JSON array of `{nickname, balance, apr}` objects.

use std::fs;
use std::str::FromStr;

use crate::errors::CliError;
use crate::registry::{Card, CardRegistry};
use crate::simulation::{PayoffEngine, PayoffPlan, Strategy, DEFAULT_HORIZON_MONTHS};

use super::output;

const USAGE: &str = "Usage:
  payoff_cli                          interactive session
  payoff_cli simulate --cards <file> --budget <amount> [options]

Options for simulate:
  --cards <file>       JSON array of {nickname, balance, apr}
  --budget <amount>    monthly budget; repeat for a comparison table
  --strategy <name>    avalanche | snowball | proportional (default: avalanche)
  --horizon <months>   non-convergence bound (default: 600)
  --schedule           print the month-by-month schedule";

pub fn run_headless(args: &[String]) -> Result<(), CliError> {
    match args.first().map(|s| s.as_str()) {
        Some("simulate") => simulate(&args[1..]),
        Some("help") | Some("--help") | Some("-h") => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => Err(CliError::Command(format!(
            "unknown command `{}` (try `payoff_cli help`)",
            other
        ))),
        None => Err(CliError::Command("missing command".into())),
    }
}

struct SimulateArgs {
    cards_file: String,
    budgets: Vec<f64>,
    strategy: Strategy,
    horizon_months: u32,
    show_schedule: bool,
}

fn parse_args(args: &[String]) -> Result<SimulateArgs, CliError> {
    let mut cards_file = None;
    let mut budgets = Vec::new();
    let mut strategy = Strategy::Avalanche;
    let mut horizon_months = DEFAULT_HORIZON_MONTHS;
    let mut show_schedule = false;

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--cards" => {
                cards_file = Some(expect_value(&mut iter, "--cards")?);
            }
            "--budget" => {
                let raw = expect_value(&mut iter, "--budget")?;
                let budget: f64 = raw
                    .parse()
                    .map_err(|_| CliError::Input(format!("invalid budget `{}`", raw)))?;
                budgets.push(budget);
            }
            "--strategy" => {
                let raw = expect_value(&mut iter, "--strategy")?;
                strategy = Strategy::from_str(&raw)?;
            }
            "--horizon" => {
                let raw = expect_value(&mut iter, "--horizon")?;
                horizon_months = raw
                    .parse()
                    .map_err(|_| CliError::Input(format!("invalid horizon `{}`", raw)))?;
            }
            "--schedule" => show_schedule = true,
            other => {
                return Err(CliError::Input(format!(
                    "unknown flag `{}`\n{}",
                    other, USAGE
                )))
            }
        }
    }

    let cards_file =
        cards_file.ok_or_else(|| CliError::Input(format!("--cards is required\n{}", USAGE)))?;
    if budgets.is_empty() {
        return Err(CliError::Input(format!(
            "at least one --budget is required\n{}",
            USAGE
        )));
    }
    Ok(SimulateArgs {
        cards_file,
        budgets,
        strategy,
        horizon_months,
        show_schedule,
    })
}

fn expect_value(iter: &mut std::slice::Iter<'_, String>, flag: &str) -> Result<String, CliError> {
    iter.next()
        .cloned()
        .ok_or_else(|| CliError::Input(format!("{} requires a value", flag)))
}

fn load_cards(path: &str) -> Result<Vec<Card>, CliError> {
    let data = fs::read_to_string(path)
        .map_err(|err| CliError::Input(format!("cannot read `{}`: {}", path, err)))?;
    let raw: Vec<Card> = serde_json::from_str(&data)
        .map_err(|err| CliError::Input(format!("invalid cards file `{}`: {}", path, err)))?;
    // Re-validate through the constructor and the registry so headless
    // input obeys the same rules as the interactive forms.
    let validated: Vec<Card> = raw
        .into_iter()
        .map(|c| Card::new(c.nickname, c.balance, c.apr))
        .collect::<Result<_, _>>()?;
    let registry = CardRegistry::from_cards(validated)?;
    Ok(registry.active_cards())
}

fn simulate(args: &[String]) -> Result<(), CliError> {
    let args = parse_args(args)?;
    let cards = load_cards(&args.cards_file)?;

    if args.budgets.len() > 1 {
        let rows = PayoffEngine::compare_budgets(
            &cards,
            &args.budgets,
            args.strategy,
            args.horizon_months,
        )?;
        println!("{}", output::render_comparison(args.strategy, &rows));
        return Ok(());
    }

    let plan =
        PayoffPlan::new(args.strategy, args.budgets[0]).with_horizon(args.horizon_months);
    let report = PayoffEngine::run(&cards, &plan)?;
    println!("{}", output::render_summary(&report));
    if args.show_schedule {
        println!();
        println!("{}", output::render_schedule(&report.schedule));
    }
    Ok(())
}
