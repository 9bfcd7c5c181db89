//! Interactive data-entry flows built on dialoguer prompts.

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::errors::CliError;
use crate::money::format_amount;
use crate::registry::{Card, CardRegistry};
use crate::simulation::Strategy;

fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

fn parse_non_negative(input: &str) -> Result<f64, String> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|_| "Enter a number like 1234.56".to_string())
        .and_then(|value| {
            if value.is_finite() && value >= 0.0 {
                Ok(value)
            } else {
                Err("Value must be zero or positive".to_string())
            }
        })
}

/// Add / edit / remove cards until the user is done.
pub fn card_setup(registry: &mut CardRegistry) -> Result<(), CliError> {
    loop {
        let mut items = vec!["Add a card".to_string()];
        if !registry.is_empty() {
            items.push("Edit a card's APR".into());
            items.push("Remove a card".into());
        }
        items.push("Done".into());

        let choice = Select::with_theme(&theme())
            .with_prompt("Card setup")
            .items(&items)
            .default(0)
            .interact()?;

        match items[choice].as_str() {
            "Add a card" => add_card(registry)?,
            "Edit a card's APR" => edit_apr(registry)?,
            "Remove a card" => remove_card(registry)?,
            _ => break,
        }
    }
    Ok(())
}

fn add_card(registry: &mut CardRegistry) -> Result<(), CliError> {
    let existing: Vec<String> = registry
        .cards()
        .iter()
        .map(|c| c.nickname.to_ascii_lowercase())
        .collect();
    let nickname: String = Input::with_theme(&theme())
        .with_prompt("Nickname")
        .validate_with(move |input: &String| -> Result<(), String> {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                return Err("Nickname is required".into());
            }
            if existing.contains(&trimmed.to_ascii_lowercase()) {
                return Err(format!("Nickname already exists: `{}`", trimmed));
            }
            Ok(())
        })
        .interact_text()?;

    let apr: String = Input::with_theme(&theme())
        .with_prompt("APR (%)")
        .validate_with(|input: &String| parse_non_negative(input).map(|_| ()))
        .interact_text()?;

    let balance: String = Input::with_theme(&theme())
        .with_prompt("Current balance")
        .default("0".into())
        .validate_with(|input: &String| parse_non_negative(input).map(|_| ()))
        .interact_text()?;

    let card = Card::new(
        nickname,
        parse_non_negative(&balance).map_err(CliError::Input)?,
        parse_non_negative(&apr).map_err(CliError::Input)?,
    )?;
    println!("Added {}.", card.nickname.clone().green());
    registry.add(card)?;
    Ok(())
}

fn pick_card(registry: &CardRegistry, prompt: &str) -> Result<Option<String>, CliError> {
    let mut items: Vec<String> = registry
        .cards()
        .iter()
        .map(|c| {
            format!(
                "{}  (balance {}, APR {:.2}%)",
                c.nickname,
                format_amount(c.balance),
                c.apr
            )
        })
        .collect();
    items.push("← Back".into());

    let choice = Select::with_theme(&theme())
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;

    if choice == items.len() - 1 {
        return Ok(None);
    }
    Ok(Some(registry.cards()[choice].nickname.clone()))
}

fn edit_apr(registry: &mut CardRegistry) -> Result<(), CliError> {
    let Some(nickname) = pick_card(registry, "Which card's APR?")? else {
        return Ok(());
    };
    let apr: String = Input::with_theme(&theme())
        .with_prompt(format!("New APR (%) for {}", nickname))
        .validate_with(|input: &String| parse_non_negative(input).map(|_| ()))
        .interact_text()?;
    registry.update_apr(&nickname, parse_non_negative(&apr).map_err(CliError::Input)?)?;
    Ok(())
}

fn remove_card(registry: &mut CardRegistry) -> Result<(), CliError> {
    let Some(nickname) = pick_card(registry, "Remove which card?")? else {
        return Ok(());
    };
    let confirmed = Confirm::with_theme(&theme())
        .with_prompt(format!("Remove `{}`?", nickname))
        .default(false)
        .interact()?;
    if confirmed {
        registry.remove(&nickname)?;
        println!("Removed {}.", nickname.yellow());
    }
    Ok(())
}

/// Prompts for the current balance of every card. Enter keeps the
/// remembered value.
pub fn refresh_balances(registry: &mut CardRegistry) -> Result<(), CliError> {
    let cards: Vec<Card> = registry.cards().to_vec();
    for card in cards {
        let entered: String = Input::with_theme(&theme())
            .with_prompt(format!(
                "{} (APR {:.2}%) balance",
                card.nickname, card.apr
            ))
            .default(format!("{:.2}", card.balance))
            .validate_with(|input: &String| parse_non_negative(input).map(|_| ()))
            .interact_text()?;
        let balance = parse_non_negative(&entered).map_err(CliError::Input)?;
        registry.update_balance(&card.nickname, balance)?;
    }
    Ok(())
}

/// Records payments already made this month. Payments to the same card
/// accumulate; each one reduces the balance before simulation.
pub fn record_payments(registry: &mut CardRegistry) -> Result<(), CliError> {
    if registry.is_empty() {
        println!("No cards to pay. Set up cards first.");
        return Ok(());
    }
    loop {
        let Some(nickname) = pick_card(registry, "Payment to which card? (Back when done)")?
        else {
            break;
        };
        let amount: String = Input::with_theme(&theme())
            .with_prompt(format!("Payment amount to {}", nickname))
            .validate_with(|input: &String| parse_non_negative(input).map(|_| ()))
            .interact_text()?;
        registry.apply_payment(&nickname, parse_non_negative(&amount).map_err(CliError::Input)?)?;
        let remaining = registry
            .get(&nickname)
            .map(|c| c.balance)
            .unwrap_or_default();
        println!(
            "Recorded. {} now at {}.",
            nickname,
            format_amount(remaining).green()
        );
    }
    Ok(())
}

/// Strategy picker with the one-line explanations shown above the menu.
pub fn pick_strategy(current: Strategy) -> Result<Strategy, CliError> {
    for strategy in Strategy::ALL {
        println!("{}", strategy.label().bold());
        println!("  {}", strategy.explanation());
    }
    let labels: Vec<&str> = Strategy::ALL.iter().map(|s| s.label()).collect();
    let default = Strategy::ALL
        .iter()
        .position(|s| *s == current)
        .unwrap_or(0);
    let choice = Select::with_theme(&theme())
        .with_prompt("Payoff strategy")
        .items(&labels)
        .default(default)
        .interact()?;
    Ok(Strategy::ALL[choice])
}

/// Optional custom monthly budget; empty input means none.
pub fn custom_budget(current: Option<f64>) -> Result<Option<f64>, CliError> {
    let entered: String = Input::with_theme(&theme())
        .with_prompt("Custom monthly budget (blank for none)")
        .default(current.map(|v| format!("{:.2}", v)).unwrap_or_default())
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            if input.trim().is_empty() {
                return Ok(());
            }
            parse_non_negative(input).and_then(|value| {
                if value > 0.0 {
                    Ok(())
                } else {
                    Err("Budget must be greater than zero".into())
                }
            })
        })
        .interact_text()?;
    if entered.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_non_negative(&entered).map_err(CliError::Input)?))
}
