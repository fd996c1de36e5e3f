//! `taxiledger` - CLI for the taxi operator ledger
//!
//! This binary provides onboarding, licensing, revenue, expense and
//! maintenance commands over the local database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::debug;

use taxiledger::cli::{
    ActivateCommand, AdminCommand, Cli, Command, ConfigCommand, DashboardCommand,
    ExpenseAddArgs, ExpenseCommand, MaintenanceAddArgs, MaintenanceCommand, OnboardCommand,
    RevenueAddArgs, RevenueCommand,
};
use taxiledger::clock::SystemClock;
use taxiledger::ledger::{self, Dashboard, ExpenseRecord, RevenueRecord};
use taxiledger::license::{Activation, CodeScheme, LicenseManager};
use taxiledger::maintenance::{self, Health, MaintenanceRecord};
use taxiledger::profile::OnboardingForm;
use taxiledger::{init_logging, Config, Error, Storage};

type Manager<'a> = LicenseManager<'a, Storage, SystemClock>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Config commands must work even when the current file is invalid
    if let Command::Config(config_cmd) = &cli.command {
        return handle_config(cli.config.clone(), config_cmd);
    }

    let config = Config::load_from(cli.config.clone())?;

    if let Command::Admin(AdminCommand::Codes { identifier, json }) = &cli.command {
        return handle_admin_codes(&config, identifier, *json);
    }

    let storage = Storage::open(config.database_path())?;
    let clock = SystemClock;
    let manager = LicenseManager::new(&storage, &clock, &config.license)?;

    match cli.command {
        Command::Onboard(cmd) => handle_onboard(&manager, cmd),
        Command::Unlock(cmd) => handle_unlock(&manager, &cmd.pin),
        Command::Status(cmd) => handle_status(&manager, &storage, cmd.json),
        Command::Activate(cmd) => handle_activate(&manager, &cmd),
        Command::Revenue(cmd) => {
            print_banner(&manager)?;
            handle_revenue(&storage, cmd)
        }
        Command::Expense(cmd) => {
            print_banner(&manager)?;
            handle_expense(&storage, cmd)
        }
        Command::Maintenance(cmd) => {
            print_banner(&manager)?;
            handle_maintenance(&config, &storage, cmd)
        }
        Command::Dashboard(cmd) => {
            print_banner(&manager)?;
            handle_dashboard(&config, &storage, &cmd)
        }
        Command::Admin(_) | Command::Config(_) => Ok(()),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Expiry reminder on stderr, shown while codes may be entered.
fn print_banner(manager: &Manager<'_>) -> anyhow::Result<()> {
    let state = manager.state()?;
    if state.is_trial_expired {
        eprintln!("*** License expired. Run `taxiledger activate <code>` to continue. ***");
    } else if state.show_warning {
        eprintln!(
            "*** License expires in {} day(s). Run `taxiledger activate <code>` to extend. ***",
            state.days_remaining
        );
    }
    Ok(())
}

fn handle_onboard(manager: &Manager<'_>, cmd: OnboardCommand) -> anyhow::Result<()> {
    let form = OnboardingForm {
        vehicle_type: cmd.vehicle.into(),
        first_name: cmd.first_name,
        last_name: cmd.last_name,
        phone: cmd.phone,
        plate: cmd.plate,
        pin: cmd.pin,
        fuel: cmd.fuel,
    };
    let profile = manager.onboard(form)?;

    println!("Welcome, {} {}.", profile.first_name, profile.last_name);
    println!("Vehicle:       {} {}", profile.vehicle_type, profile.identifier);
    println!(
        "Trial ends:    {}",
        profile.license_expiry.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

fn handle_unlock(manager: &Manager<'_>, pin: &str) -> anyhow::Result<()> {
    if manager.profile()?.is_none() {
        return Err(Error::ProfileMissing.into());
    }
    if !manager.unlock(pin)? {
        bail!("incorrect pin");
    }
    println!("Unlocked.");
    Ok(())
}

fn handle_status(manager: &Manager<'_>, storage: &Storage, json: bool) -> anyhow::Result<()> {
    let profile = manager.profile()?;
    let state = manager.state()?;
    let stats = storage.stats()?;

    if json {
        let status = serde_json::json!({
            "phase": state.phase(),
            "license": state,
            "profile": profile,
            "database_path": storage.path(),
            "storage": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    print_banner(manager)?;
    println!("taxiledger status");
    println!("-----------------");
    match &profile {
        Some(p) => {
            println!("Operator:      {} {}", p.first_name, p.last_name);
            println!("Vehicle:       {} {} ({})", p.vehicle_type, p.identifier, p.fuel);
        }
        None => println!("Operator:      none (run `taxiledger onboard`)"),
    }
    if let Some(expiry) = state.expiry {
        println!(
            "License until: {}",
            expiry.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
        println!("Days left:     {}", state.days_remaining);
    }
    println!("Database:      {}", storage.path().display());
    println!(
        "Records:       {} revenue, {} expenses, {} services",
        stats.revenue_records, stats.expense_records, stats.maintenance_records
    );
    Ok(())
}

fn handle_activate(manager: &Manager<'_>, cmd: &ActivateCommand) -> anyhow::Result<()> {
    let outcome = manager.activate(&cmd.code)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    match outcome {
        Activation::Extended {
            duration,
            new_expiry,
            ..
        } => {
            if !cmd.json {
                println!("Activated: {}", duration.label());
                println!(
                    "License until: {}",
                    new_expiry.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }
        Activation::InvalidCode => bail!("activation code rejected"),
        Activation::NoProfile => Err(Error::ProfileMissing.into()),
    }
}

fn handle_admin_codes(config: &Config, identifier: &str, json: bool) -> anyhow::Result<()> {
    let codes = CodeScheme::from_config(&config.license)?.issue_all(identifier)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&codes)?);
    } else {
        println!("Activation codes for {}", identifier.trim());
        for issued in &codes {
            println!("  {:<8}  {}", issued.label, issued.code);
        }
    }
    Ok(())
}

fn handle_revenue(storage: &Storage, cmd: RevenueCommand) -> anyhow::Result<()> {
    match cmd {
        RevenueCommand::Add(args) => add_revenue(storage, args),
        RevenueCommand::List { limit, json } => {
            let records = storage.recent_revenue(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            if records.is_empty() {
                println!("No revenue recorded yet.");
                return Ok(());
            }
            println!(
                "{:<10}  {:<7}  {:>12}  {:>12}  {:>7}  {:>9}",
                "Date", "Shift", "Gross", "Net", "Km", "L/100km"
            );
            for r in &records {
                println!(
                    "{:<10}  {:<7}  {:>12}  {:>12}  {:>7}  {:>9.1}",
                    r.date,
                    r.shift,
                    ledger::format_dinars(r.gross_amount),
                    ledger::format_dinars(r.net()),
                    r.distance(),
                    r.consumption()
                );
            }
            Ok(())
        }
    }
}

fn add_revenue(storage: &Storage, args: RevenueAddArgs) -> anyhow::Result<()> {
    let record = RevenueRecord {
        id: None,
        date: args.date.unwrap_or_else(today),
        shift: args.shift.into(),
        gross_amount: args.gross,
        fuel_amount: args.fuel_litres,
        fuel_cost: args.fuel_cost,
        fuel_types: args.fuel_types,
        other_expenses: args.other,
        mileage_start: args.mileage_start,
        mileage_end: args.mileage_end,
    };
    let id = storage.insert_revenue(&record)?;
    debug!("Revenue stored with id {}", id);

    println!(
        "Recorded {} ({}): net {} over {} km",
        record.date,
        record.shift,
        ledger::format_dinars(record.net()),
        record.distance()
    );
    Ok(())
}

fn handle_expense(storage: &Storage, cmd: ExpenseCommand) -> anyhow::Result<()> {
    match cmd {
        ExpenseCommand::Add(args) => add_expense(storage, args),
        ExpenseCommand::List { reminders, json } => {
            let expenses = storage.list_expenses()?;
            let shown: Vec<&ExpenseRecord> = if reminders {
                ledger::reminders(&expenses)
            } else {
                expenses.iter().collect()
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
                return Ok(());
            }
            if shown.is_empty() {
                println!("No expenses to show.");
                return Ok(());
            }
            for e in shown {
                let expiry = e
                    .expiry_date
                    .map_or_else(String::new, |d| format!("  expires {d}"));
                println!(
                    "{:<16}  {:<8}  {:>12}  {:<12}{}",
                    e.category,
                    e.kind,
                    ledger::format_dinars(e.amount),
                    e.frequency,
                    expiry
                );
            }
            Ok(())
        }
    }
}

fn add_expense(storage: &Storage, args: ExpenseAddArgs) -> anyhow::Result<()> {
    let record = ExpenseRecord {
        id: None,
        kind: args.kind.into(),
        category: args.category,
        amount: args.amount,
        frequency: args.frequency,
        expiry_date: args.expires,
    };
    storage.insert_expense(&record)?;
    println!(
        "Recorded {} expense of {} ({})",
        record.category,
        ledger::format_dinars(record.amount),
        record.frequency
    );
    Ok(())
}

fn health_label(health: Health) -> &'static str {
    match health {
        Health::Ok => "OK",
        Health::Warning => "SOON",
        Health::Danger => "DUE",
    }
}

fn handle_maintenance(
    config: &Config,
    storage: &Storage,
    cmd: MaintenanceCommand,
) -> anyhow::Result<()> {
    match cmd {
        MaintenanceCommand::Add(args) => add_maintenance(storage, args),
        MaintenanceCommand::Status { mileage, json } => {
            let current = match mileage {
                Some(km) => km,
                None => storage.latest_mileage()?.unwrap_or(0),
            };
            let report = maintenance::assess(
                &storage.list_maintenance()?,
                current,
                config.maintenance.warning_km,
            );

            if json {
                let out = serde_json::json!({
                    "current_mileage": current,
                    "systems": report,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            println!("Odometer: {current} km");
            for system in &report {
                match system.most_urgent() {
                    Some(task) => println!(
                        "  [{:<4}] {:<16} {} in {} km",
                        health_label(system.health),
                        system.label,
                        task.label,
                        task.remaining_km
                    ),
                    None => println!("  [{:<4}] {:<16} no service recorded", "-", system.label),
                }
            }
            Ok(())
        }
        MaintenanceCommand::Catalog { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(maintenance::SYSTEMS)?);
                return Ok(());
            }
            for system in maintenance::SYSTEMS {
                println!("{}", system.label);
                for part in system.subsystems {
                    println!("  {:<24} {:<24} {:>7} km", part.id, part.label, part.interval_km);
                }
            }
            Ok(())
        }
    }
}

fn add_maintenance(storage: &Storage, args: MaintenanceAddArgs) -> anyhow::Result<()> {
    let record = MaintenanceRecord {
        id: None,
        date: args.date.unwrap_or_else(today),
        mileage: args.mileage,
        subsystem: args.part,
        brand: args.brand,
        price: args.price,
    };
    storage.insert_maintenance(&record)?;

    if let Some((_, part)) = maintenance::find_subsystem(&record.subsystem) {
        println!(
            "Recorded {} at {} km; next due at {} km",
            part.label,
            record.mileage,
            u64::from(record.mileage) + u64::from(part.interval_km)
        );
    }
    Ok(())
}

fn handle_dashboard(
    config: &Config,
    storage: &Storage,
    cmd: &DashboardCommand,
) -> anyhow::Result<()> {
    let window = cmd.days.unwrap_or(config.maintenance.recent_revenue_window);
    let dashboard = Dashboard::from_records(&storage.recent_revenue(window)?);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    println!("Last {} record(s)", dashboard.days);
    println!("------------------");
    println!("Gross:         {}", ledger::format_dinars(dashboard.gross));
    println!("Fuel:          {}", ledger::format_dinars(dashboard.fuel_cost));
    println!("Other:         {}", ledger::format_dinars(dashboard.other_expenses));
    println!("Net:           {}", ledger::format_dinars(dashboard.net));
    println!("Consumption:   {:.1} L/100km", dashboard.average_consumption);
    if let Some(km) = dashboard.current_mileage {
        println!("Odometer:      {km} km");
    }
    Ok(())
}

fn handle_config(path: Option<std::path::PathBuf>, cmd: &ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let mut config = Config::load_from(path)?;
            config.license.secret = "<redacted>".to_string();
            if config.license.keyed_secret.is_some() {
                config.license.keyed_secret = Some("<redacted>".to_string());
            }

            if *json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[License]");
                println!("  Trial days:         {}", config.license.trial_days);
                println!("  Warning days:       {}", config.license.warning_days);
                println!("  Code scheme:        {:?}", config.license.scheme);
                println!("  Developer bypass:   {}", config.license.developer_bypass);
                println!();
                println!("[Maintenance]");
                println!("  Warning distance:   {} km", config.maintenance.warning_km);
                println!(
                    "  Dashboard window:   {} records",
                    config.maintenance.recent_revenue_window
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let target = file.clone().or(path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", target.display());
            Config::load_from(Some(target.clone()))
                .with_context(|| format!("configuration at {} is invalid", target.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
