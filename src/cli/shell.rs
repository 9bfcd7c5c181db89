use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use tracing::info;

use crate::config::{ConfigManager, SessionConfig};
use crate::errors::CliError;
use crate::money::format_amount;
use crate::registry::CardRegistry;
use crate::simulation::{PayoffEngine, PayoffPlan};
use crate::storage::{
    resolve_cards, CardProfile, JsonStore, StoredBalances, StoredCards, STORE_SCHEMA_VERSION,
};

use super::{forms, output};

/// Interactive session against the default store location.
pub fn run_cli() -> Result<(), CliError> {
    let store = JsonStore::open_default()?;
    run_with_store(&store)
}

pub fn run_with_store(store: &JsonStore) -> Result<(), CliError> {
    let config_manager = ConfigManager::new(store.base_dir());
    let mut config = config_manager.load()?;

    let profiles = store.load_profiles()?;
    let balances = store.load_balances()?;
    let mut registry = CardRegistry::from_cards(resolve_cards(&profiles, &balances)?)?;

    println!("{}", "Credit Card Payoff Simulator".bold().cyan());
    if registry.is_empty() {
        println!("First run: set up your cards once; they will be remembered.");
    } else {
        println!(
            "Loaded {} remembered card(s), total balance {}.",
            registry.len(),
            format_amount(registry.total_balance())
        );
    }

    loop {
        let items = [
            "Set up cards",
            "Update balances",
            "Record payments made this month",
            "Choose strategy",
            "Run payoff estimates",
            "Show full schedule",
            "Reset remembered data",
            "Quit",
        ];
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Main menu (strategy: {})", config.strategy))
            .items(&items)
            .default(4)
            .interact()?;

        match items[choice] {
            "Set up cards" => forms::card_setup(&mut registry)?,
            "Update balances" => forms::refresh_balances(&mut registry)?,
            "Record payments made this month" => forms::record_payments(&mut registry)?,
            "Choose strategy" => config.strategy = forms::pick_strategy(config.strategy)?,
            "Run payoff estimates" => {
                run_estimates(store, &registry, &mut config)?;
                config_manager.save(&config)?;
            }
            "Show full schedule" => show_schedule(&registry, &config)?,
            "Reset remembered data" => reset_remembered(store)?,
            _ => {
                persist(store, &registry)?;
                config_manager.save(&config)?;
                break;
            }
        }
    }
    Ok(())
}

fn run_estimates(
    store: &JsonStore,
    registry: &CardRegistry,
    config: &mut SessionConfig,
) -> Result<(), CliError> {
    if registry.active_cards().is_empty() {
        println!("Nothing to simulate: no card carries a balance.");
        return Ok(());
    }

    config.custom_budget = forms::custom_budget(config.custom_budget)?;

    // Balances are auto-saved at the moment the user runs, like the
    // remembered values they expect to see next session.
    persist(store, registry)?;
    info!(cards = registry.len(), "saved remembered cards and balances");

    let cards = registry.active_cards();
    let budgets = config.budgets();
    let rows =
        PayoffEngine::compare_budgets(&cards, &budgets, config.strategy, config.horizon_months)?;
    println!();
    println!("{}", output::render_comparison(config.strategy, &rows));

    for budget in budgets {
        let plan = PayoffPlan::new(config.strategy, budget).with_horizon(config.horizon_months);
        let report = PayoffEngine::run(&cards, &plan)?;
        println!();
        println!("{}", output::render_summary(&report));
    }
    Ok(())
}

fn show_schedule(registry: &CardRegistry, config: &SessionConfig) -> Result<(), CliError> {
    if registry.active_cards().is_empty() {
        println!("Nothing to simulate: no card carries a balance.");
        return Ok(());
    }
    let budgets = config.budgets();
    let labels: Vec<String> = budgets.iter().map(|b| format_amount(*b)).collect();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Schedule for which monthly budget?")
        .items(&labels)
        .default(0)
        .interact()?;

    let plan =
        PayoffPlan::new(config.strategy, budgets[choice]).with_horizon(config.horizon_months);
    let report = PayoffEngine::run(&registry.active_cards(), &plan)?;
    println!();
    println!("{}", output::render_summary(&report));
    println!();
    println!("{}", output::render_schedule(&report.schedule));
    Ok(())
}

fn reset_remembered(store: &JsonStore) -> Result<(), CliError> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Delete remembered cards and balances?")
        .default(false)
        .interact()?;
    if confirmed {
        store.reset_profiles()?;
        store.reset_balances()?;
        println!("{}", "Remembered data deleted.".yellow());
    }
    Ok(())
}

fn persist(store: &JsonStore, registry: &CardRegistry) -> Result<(), CliError> {
    let profiles = StoredCards {
        schema_version: STORE_SCHEMA_VERSION,
        profiles: registry
            .cards()
            .iter()
            .map(|c| CardProfile {
                nickname: c.nickname.clone(),
                apr: c.apr,
            })
            .collect(),
    };
    store.save_profiles(&profiles)?;

    let mut balances = StoredBalances::default();
    for card in registry.cards() {
        balances.balances.insert(card.nickname.clone(), card.balance);
    }
    store.save_balances(&balances)?;
    Ok(())
}
