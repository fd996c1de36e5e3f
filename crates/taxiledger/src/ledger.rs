//! Daily revenue and recurring expense records, and the dashboard figures
//! derived from them.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};

/// Most fuels a single revenue day may list (hybrids).
pub const MAX_FUEL_TYPES: usize = 2;

text_enum! {
    /// Working shift.
    pub enum Shift {
        /// Morning.
        Matin => "Matin",
        /// Evening.
        Soir => "Soir",
        /// Full day.
        Journee => "Journee",
    }
}

text_enum! {
    /// Fuel bought during a shift.
    pub enum Fuel {
        /// Petrol.
        Essence => "Essence",
        /// Diesel.
        Gasoil => "Gasoil",
        /// Low-sulphur diesel.
        Gasoil50 => "Gasoil 50",
        /// Liquefied petroleum gas.
        Gpl => "GPL",
        /// Charging.
        Electrique => "Electrique",
    }
}

text_enum! {
    /// Whether an expense recurs at a fixed amount.
    pub enum ExpenseKind {
        /// Fixed charge.
        Fixe => "Fixe",
        /// Variable charge.
        Variable => "Variable",
    }
}

text_enum! {
    /// What an expense pays for.
    pub enum ExpenseCategory {
        /// Insurance.
        Assurance => "Assurance",
        /// Road tax sticker.
        Vignette => "Vignette",
        /// Roadworthiness inspection.
        VisiteTechnique => "Visite Technique",
        /// Radio or trading tax.
        Taxe => "Taxe",
        /// Vehicle or garage rent.
        Loyer => "Loyer",
        /// Parking.
        Parking => "Parking",
        /// Washing.
        Lavage => "Lavage",
        /// Anything else.
        Autre => "Autre",
    }
}

text_enum! {
    /// How often an expense recurs.
    pub enum Frequency {
        /// Every day.
        Quotidien => "Quotidien",
        /// Every week.
        Hebdomadaire => "Hebdomadaire",
        /// Every month.
        Mensuel => "Mensuel",
        /// Every quarter.
        Trimestriel => "Trimestriel",
        /// Every year.
        Annuel => "Annuel",
    }
}

/// One recorded working day or shift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueRecord {
    /// Storage id, `None` until inserted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Day worked.
    pub date: NaiveDate,
    /// Shift worked.
    pub shift: Shift,
    /// Fares collected.
    pub gross_amount: f64,
    /// Litres of fuel bought.
    pub fuel_amount: f64,
    /// Amount paid for fuel.
    pub fuel_cost: f64,
    /// Fuels bought.
    pub fuel_types: Vec<Fuel>,
    /// Other costs of the day.
    pub other_expenses: f64,
    /// Odometer at start (km).
    pub mileage_start: u32,
    /// Odometer at end (km).
    pub mileage_end: u32,
}

impl RevenueRecord {
    /// Kilometres driven.
    #[must_use]
    pub fn distance(&self) -> u32 {
        self.mileage_end.saturating_sub(self.mileage_start)
    }

    /// Gross minus fuel and other expenses.
    #[must_use]
    pub fn net(&self) -> f64 {
        self.gross_amount - self.fuel_cost - self.other_expenses
    }

    /// Litres per 100 km. A zero distance counts as 1 km.
    #[must_use]
    pub fn consumption(&self) -> f64 {
        let distance = self.distance().max(1);
        self.fuel_amount / f64::from(distance) * 100.0
    }

    /// Check the record before storing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for negative amounts, more than two fuel
    /// types, or an odometer that runs backwards.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("gross_amount", self.gross_amount),
            ("fuel_amount", self.fuel_amount),
            ("fuel_cost", self.fuel_cost),
            ("other_expenses", self.other_expenses),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::validation(field, "must be a non-negative amount"));
            }
        }
        if self.fuel_types.len() > MAX_FUEL_TYPES {
            return Err(Error::validation(
                "fuel_types",
                format!("at most {MAX_FUEL_TYPES} fuel types"),
            ));
        }
        if self.mileage_end < self.mileage_start {
            return Err(Error::validation(
                "mileage_end",
                format!(
                    "{} is below the starting odometer {}",
                    self.mileage_end, self.mileage_start
                ),
            ));
        }
        Ok(())
    }
}

/// A recurring charge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRecord {
    /// Storage id, `None` until inserted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Fixed or variable.
    pub kind: ExpenseKind,
    /// What it pays for.
    pub category: ExpenseCategory,
    /// Amount per period.
    pub amount: f64,
    /// Recurrence.
    pub frequency: Frequency,
    /// Date the current period lapses (insurance, sticker...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

impl ExpenseRecord {
    /// Check the record before storing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a negative or non-finite amount.
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::validation("amount", "must be a non-negative amount"));
        }
        Ok(())
    }
}

/// Figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Number of revenue records aggregated.
    pub days: usize,
    /// Total fares.
    pub gross: f64,
    /// Total fuel cost.
    pub fuel_cost: f64,
    /// Total other expenses.
    pub other_expenses: f64,
    /// Gross minus fuel and other expenses.
    pub net: f64,
    /// Mean of per-record consumption (L/100km), 0 with no records.
    pub average_consumption: f64,
    /// Latest odometer reading, if any.
    pub current_mileage: Option<u32>,
}

impl Dashboard {
    /// Aggregate `records` (any order).
    #[must_use]
    pub fn from_records(records: &[RevenueRecord]) -> Self {
        let gross: f64 = records.iter().map(|r| r.gross_amount).sum();
        let fuel_cost: f64 = records.iter().map(|r| r.fuel_cost).sum();
        let other_expenses: f64 = records.iter().map(|r| r.other_expenses).sum();

        let average_consumption = if records.is_empty() {
            0.0
        } else {
            let total: f64 = records.iter().map(RevenueRecord::consumption).sum();
            // Record counts stay far below f64's exact integer range
            #[allow(clippy::cast_precision_loss)]
            let count = records.len() as f64;
            total / count
        };

        let current_mileage = records
            .iter()
            .max_by_key(|r| (r.date, r.id))
            .map(|r| r.mileage_end);

        Self {
            days: records.len(),
            gross,
            fuel_cost,
            other_expenses,
            net: gross - fuel_cost - other_expenses,
            average_consumption,
            current_mileage,
        }
    }
}

/// Expenses with an expiry date, soonest first.
#[must_use]
pub fn reminders(expenses: &[ExpenseRecord]) -> Vec<&ExpenseRecord> {
    let mut due: Vec<&ExpenseRecord> = expenses.iter().filter(|e| e.expiry_date.is_some()).collect();
    due.sort_by_key(|e| e.expiry_date);
    due
}

/// Format an amount in dinars with millimes.
#[must_use]
pub fn format_dinars(amount: f64) -> String {
    format!("{amount:.3} DT")
}
