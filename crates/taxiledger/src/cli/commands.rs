//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::ledger::{ExpenseCategory, ExpenseKind, Frequency, Fuel, Shift};
use crate::profile::{EngineFuel, VehicleType};

/// Parse one of the crate's text labels (`"Gasoil 50"`, `"Visite Technique"`...).
fn label<T>(s: &str) -> Result<T, String>
where
    T: FromStr<Err = crate::Error>,
{
    s.parse().map_err(|e: crate::Error| e.to_string())
}

/// Onboarding arguments.
#[derive(Debug, Args)]
pub struct OnboardCommand {
    /// Vehicle kind
    #[arg(long, value_enum, default_value = "taxi")]
    pub vehicle: VehicleArg,

    /// Operator first name
    #[arg(long)]
    pub first_name: String,

    /// Operator last name
    #[arg(long)]
    pub last_name: String,

    /// Contact phone
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Vehicle plate (e.g., "200 TU 5555")
    #[arg(long)]
    pub plate: String,

    /// Four-digit unlock pin
    #[arg(long)]
    pub pin: String,

    /// Engine fuel (e.g., "Gasoil", "Essence + GPL")
    #[arg(long, value_parser = label::<EngineFuel>, default_value = "Essence")]
    pub fuel: EngineFuel,
}

/// Unlock arguments.
#[derive(Debug, Args)]
pub struct UnlockCommand {
    /// The four-digit pin
    pub pin: String,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Activation arguments.
#[derive(Debug, Args)]
pub struct ActivateCommand {
    /// The 8-digit activation code
    pub code: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Code distribution commands.
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Print the activation code of every duration for a plate
    Codes {
        /// Vehicle plate the codes are bound to
        identifier: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Revenue commands.
#[derive(Debug, Subcommand)]
pub enum RevenueCommand {
    /// Record a working day or shift
    Add(RevenueAddArgs),

    /// List recent revenue records
    List {
        /// Maximum number of records
        #[arg(short, long, default_value = "30")]
        limit: usize,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Arguments for recording revenue.
#[derive(Debug, Args)]
pub struct RevenueAddArgs {
    /// Day worked (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Shift worked
    #[arg(long, value_enum, default_value = "journee")]
    pub shift: ShiftArg,

    /// Fares collected
    #[arg(long)]
    pub gross: f64,

    /// Litres of fuel bought
    #[arg(long, default_value = "0")]
    pub fuel_litres: f64,

    /// Amount paid for fuel
    #[arg(long, default_value = "0")]
    pub fuel_cost: f64,

    /// Fuel bought (repeat for hybrids, at most twice)
    #[arg(long = "fuel-type", value_parser = label::<Fuel>)]
    pub fuel_types: Vec<Fuel>,

    /// Other costs of the day
    #[arg(long, default_value = "0")]
    pub other: f64,

    /// Odometer at start (km)
    #[arg(long)]
    pub mileage_start: u32,

    /// Odometer at end (km)
    #[arg(long)]
    pub mileage_end: u32,
}

/// Expense commands.
#[derive(Debug, Subcommand)]
pub enum ExpenseCommand {
    /// Record a recurring charge
    Add(ExpenseAddArgs),

    /// List recurring charges
    List {
        /// Only show charges with an expiry date, soonest first
        #[arg(short, long)]
        reminders: bool,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Arguments for recording an expense.
#[derive(Debug, Args)]
pub struct ExpenseAddArgs {
    /// Fixed or variable charge
    #[arg(long, value_enum, default_value = "fixe")]
    pub kind: ExpenseKindArg,

    /// What it pays for (e.g., "Assurance", "Visite Technique")
    #[arg(long, value_parser = label::<ExpenseCategory>)]
    pub category: ExpenseCategory,

    /// Amount per period
    #[arg(long)]
    pub amount: f64,

    /// Recurrence (e.g., "Mensuel", "Annuel")
    #[arg(long, value_parser = label::<Frequency>, default_value = "Mensuel")]
    pub frequency: Frequency,

    /// Date the current period lapses (YYYY-MM-DD)
    #[arg(long)]
    pub expires: Option<NaiveDate>,
}

/// Maintenance commands.
#[derive(Debug, Subcommand)]
pub enum MaintenanceCommand {
    /// Record a completed service
    Add(MaintenanceAddArgs),

    /// Show service health per system
    Status {
        /// Odometer reading to assess against; defaults to the latest revenue record
        #[arg(short, long)]
        mileage: Option<u32>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List serviceable parts and their intervals
    Catalog {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Arguments for recording a service.
#[derive(Debug, Args)]
pub struct MaintenanceAddArgs {
    /// Part id (see `maintenance catalog`)
    pub part: String,

    /// Odometer at service (km)
    #[arg(long)]
    pub mileage: u32,

    /// Service date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Part brand
    #[arg(long, default_value = "")]
    pub brand: String,

    /// Price paid
    #[arg(long, default_value = "0")]
    pub price: f64,
}

/// Dashboard arguments.
#[derive(Debug, Args)]
pub struct DashboardCommand {
    /// Number of recent revenue records to aggregate; defaults to the configured window
    #[arg(short, long)]
    pub days: Option<usize>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Vehicle kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VehicleArg {
    /// Urban taxi
    Taxi,
    /// Intercity shared taxi
    Louage,
}

impl From<VehicleArg> for VehicleType {
    fn from(arg: VehicleArg) -> Self {
        match arg {
            VehicleArg::Taxi => Self::Taxi,
            VehicleArg::Louage => Self::Louage,
        }
    }
}

/// Shift argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShiftArg {
    /// Morning
    Matin,
    /// Evening
    Soir,
    /// Full day
    Journee,
}

impl From<ShiftArg> for Shift {
    fn from(arg: ShiftArg) -> Self {
        match arg {
            ShiftArg::Matin => Self::Matin,
            ShiftArg::Soir => Self::Soir,
            ShiftArg::Journee => Self::Journee,
        }
    }
}

/// Expense kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExpenseKindArg {
    /// Fixed charge
    Fixe,
    /// Variable charge
    Variable,
}

impl From<ExpenseKindArg> for ExpenseKind {
    fn from(arg: ExpenseKindArg) -> Self {
        match arg {
            ExpenseKindArg::Fixe => Self::Fixe,
            ExpenseKindArg::Variable => Self::Variable,
        }
    }
}
