//! Command-line interface for taxiledger.
//!
//! This module provides the CLI structure for the `taxiledger` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ActivateCommand, AdminCommand, ConfigCommand, DashboardCommand, ExpenseAddArgs,
    ExpenseCommand, ExpenseKindArg, MaintenanceAddArgs, MaintenanceCommand, OnboardCommand,
    RevenueAddArgs, RevenueCommand, ShiftArg, StatusCommand, UnlockCommand, VehicleArg,
};

/// taxiledger - Revenue, expense and maintenance tracking for taxi operators
///
/// Works fully offline. A trial starts at onboarding; activation codes bound
/// to the vehicle plate extend the license.
#[derive(Debug, Parser)]
#[command(name = "taxiledger")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the operator profile and start the trial
    Onboard(OnboardCommand),

    /// Check the unlock pin
    Unlock(UnlockCommand),

    /// Show license status
    Status(StatusCommand),

    /// Submit an activation code
    Activate(ActivateCommand),

    /// Issue activation codes
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Record or list daily revenue
    #[command(subcommand)]
    Revenue(RevenueCommand),

    /// Record or list recurring expenses
    #[command(subcommand)]
    Expense(ExpenseCommand),

    /// Record services and check what is due
    #[command(subcommand)]
    Maintenance(MaintenanceCommand),

    /// Show totals over recent revenue
    Dashboard(DashboardCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ExpenseCategory, Fuel};
    use crate::logging::Verbosity;
    use crate::profile::EngineFuel;
    use clap::CommandFactory;

    fn status_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "taxiledger");
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(status_cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(status_cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(status_cli(3, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_onboard() {
        let args = vec![
            "taxiledger",
            "onboard",
            "--vehicle",
            "louage",
            "--first-name",
            "Sami",
            "--last-name",
            "Ben Ali",
            "--plate",
            "200 TU 5555",
            "--pin",
            "1234",
            "--fuel",
            "essence + gpl",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Onboard(cmd) => {
                assert_eq!(cmd.vehicle, VehicleArg::Louage);
                assert_eq!(cmd.plate, "200 TU 5555");
                assert_eq!(cmd.fuel, EngineFuel::EssenceGpl);
                assert_eq!(cmd.phone, "");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_onboard_requires_plate() {
        let args = vec![
            "taxiledger",
            "onboard",
            "--first-name",
            "Sami",
            "--last-name",
            "Ben Ali",
            "--pin",
            "1234",
        ];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_activate() {
        let cli = Cli::try_parse_from(["taxiledger", "activate", "46528810", "--json"]).unwrap();
        match cli.command {
            Command::Activate(cmd) => {
                assert_eq!(cmd.code, "46528810");
                assert!(cmd.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_admin_codes() {
        let cli = Cli::try_parse_from(["taxiledger", "admin", "codes", "200 TU 5555"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Admin(AdminCommand::Codes { ref identifier, json: false }) if identifier == "200 TU 5555"
        ));
    }

    #[test]
    fn test_parse_revenue_add() {
        let args = vec![
            "taxiledger",
            "revenue",
            "add",
            "--date",
            "2025-03-01",
            "--shift",
            "soir",
            "--gross",
            "120.5",
            "--fuel-type",
            "Essence",
            "--fuel-type",
            "GPL",
            "--mileage-start",
            "10000",
            "--mileage-end",
            "10180",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Revenue(RevenueCommand::Add(add)) => {
                assert_eq!(add.shift, ShiftArg::Soir);
                assert_eq!(add.fuel_types, vec![Fuel::Essence, Fuel::Gpl]);
                assert_eq!(add.date, "2025-03-01".parse().ok());
                assert!(add.other.abs() < f64::EPSILON);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_revenue_rejects_bad_fuel() {
        let args = vec![
            "taxiledger",
            "revenue",
            "add",
            "--gross",
            "1",
            "--fuel-type",
            "kerosene",
            "--mileage-start",
            "1",
            "--mileage-end",
            "2",
        ];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_expense_add() {
        let args = vec![
            "taxiledger",
            "expense",
            "add",
            "--category",
            "Visite Technique",
            "--amount",
            "45",
            "--expires",
            "2025-09-30",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Expense(ExpenseCommand::Add(add)) => {
                assert_eq!(add.category, ExpenseCategory::VisiteTechnique);
                assert_eq!(add.kind, ExpenseKindArg::Fixe);
                assert!(add.expires.is_some());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_maintenance_status() {
        let cli =
            Cli::try_parse_from(["taxiledger", "maintenance", "status", "-m", "52000"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Maintenance(MaintenanceCommand::Status {
                mileage: Some(52_000),
                json: false
            })
        ));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli =
            Cli::try_parse_from(["taxiledger", "-c", "/custom/config.toml", "-vv", "dashboard"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Dashboard(_)));
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(["taxiledger", "-q", "status"]).unwrap();
        assert!(cli.quiet);
    }
}
