//! Storage layer for taxiledger.
//!
//! This module provides `SQLite`-based persistent storage for the user
//! profile, daily revenue, recurring expenses and service history.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::ledger::{ExpenseRecord, Fuel, RevenueRecord};
use crate::maintenance::MaintenanceRecord;
use crate::profile::{NewProfile, ProfileStore, UserProfile};

/// Row id of the profile singleton.
const PROFILE_ID: i64 = 1;

/// Report undecodable column values as corrupt rows, everything else as a query failure.
fn decode_error(table: &'static str, err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..)
        | rusqlite::Error::InvalidColumnType(..) => Error::corrupt_row(table, err.to_string()),
        other => other.into(),
    }
}

/// Storage engine for the ledger.
///
/// Provides persistent storage using `SQLite` with support for:
/// - The single user profile and its license expiry
/// - Revenue, expense and maintenance records
/// - Recency queries for the dashboard
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // === Revenue ===

    /// Validate and insert a revenue record, returning its id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad record, or an error if the
    /// database operation fails.
    pub fn insert_revenue(&self, record: &RevenueRecord) -> Result<i64> {
        record.validate()?;
        let fuel_types = serde_json::to_string(&record.fuel_types)?;

        self.conn.execute(
            r"
            INSERT INTO revenue (date, shift, gross_amount, fuel_amount, fuel_cost,
                                 fuel_types, other_expenses, mileage_start, mileage_end)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
            params![
                record.date,
                record.shift,
                record.gross_amount,
                record.fuel_amount,
                record.fuel_cost,
                fuel_types,
                record.other_expenses,
                record.mileage_start,
                record.mileage_end,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted revenue record {} for {}", id, record.date);
        Ok(id)
    }

    /// The most recent revenue records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recent_revenue(&self, limit: usize) -> Result<Vec<RevenueRecord>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, date, shift, gross_amount, fuel_amount, fuel_cost,
                   fuel_types, other_expenses, mileage_start, mileage_end
            FROM revenue ORDER BY date DESC, id DESC LIMIT ?1
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map([limit_i64], Self::row_to_revenue)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| decode_error("revenue", e))?;

        Ok(records)
    }

    /// Odometer reading at the end of the most recent revenue record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn latest_mileage(&self) -> Result<Option<u32>> {
        let mileage = self
            .conn
            .query_row(
                "SELECT mileage_end FROM revenue ORDER BY date DESC, id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| decode_error("revenue", e))?;
        Ok(mileage)
    }

    // === Expenses ===

    /// Validate and insert an expense, returning its id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad record, or an error if the
    /// database operation fails.
    pub fn insert_expense(&self, record: &ExpenseRecord) -> Result<i64> {
        record.validate()?;

        self.conn.execute(
            r"
            INSERT INTO expenses (kind, category, amount, frequency, expiry_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                record.kind,
                record.category,
                record.amount,
                record.frequency,
                record.expiry_date,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted {} expense {}", record.category, id);
        Ok(id)
    }

    /// All expenses in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_expenses(&self) -> Result<Vec<ExpenseRecord>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, kind, category, amount, frequency, expiry_date
            FROM expenses ORDER BY id ASC
            ",
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(ExpenseRecord {
                    id: Some(row.get(0)?),
                    kind: row.get(1)?,
                    category: row.get(2)?,
                    amount: row.get(3)?,
                    frequency: row.get(4)?,
                    expiry_date: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| decode_error("expenses", e))?;

        Ok(records)
    }

    // === Maintenance ===

    /// Validate and insert a service record, returning its id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown part, or an error if the
    /// database operation fails.
    pub fn insert_maintenance(&self, record: &MaintenanceRecord) -> Result<i64> {
        record.validate()?;

        self.conn.execute(
            r"
            INSERT INTO maintenance (date, mileage, subsystem, brand, price)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                record.date,
                record.mileage,
                record.subsystem,
                record.brand,
                record.price,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Recorded {} service {}", record.subsystem, id);
        Ok(id)
    }

    /// Service history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_maintenance(&self) -> Result<Vec<MaintenanceRecord>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, date, mileage, subsystem, brand, price
            FROM maintenance ORDER BY date DESC, id DESC
            ",
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(MaintenanceRecord {
                    id: Some(row.get(0)?),
                    date: row.get(1)?,
                    mileage: row.get(2)?,
                    subsystem: row.get(3)?,
                    brand: row.get(4)?,
                    price: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| decode_error("maintenance", e))?;

        Ok(records)
    }

    // === Statistics ===

    fn count(&self, table: &str) -> Result<i64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            has_profile: self.count("profile")? > 0,
            revenue_records: self.count("revenue")?,
            expense_records: self.count("expenses")?,
            maintenance_records: self.count("maintenance")?,
            db_size_bytes,
        })
    }

    // === Row mapping ===

    fn instant_at(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
        let millis: i64 = row.get(idx)?;
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
    }

    fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<UserProfile> {
        Ok(UserProfile {
            id: row.get(0)?,
            vehicle_type: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            phone: row.get(4)?,
            identifier: row.get(5)?,
            pin: row.get(6)?,
            fuel: row.get(7)?,
            trial_start: Self::instant_at(row, 8)?,
            license_expiry: Self::instant_at(row, 9)?,
        })
    }

    fn row_to_revenue(row: &rusqlite::Row) -> rusqlite::Result<RevenueRecord> {
        let fuel_types_json: String = row.get(6)?;
        let fuel_types: Vec<Fuel> = serde_json::from_str(&fuel_types_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

        Ok(RevenueRecord {
            id: Some(row.get(0)?),
            date: row.get(1)?,
            shift: row.get(2)?,
            gross_amount: row.get(3)?,
            fuel_amount: row.get(4)?,
            fuel_cost: row.get(5)?,
            fuel_types,
            other_expenses: row.get(7)?,
            mileage_start: row.get(8)?,
            mileage_end: row.get(9)?,
        })
    }
}

impl ProfileStore for Storage {
    fn get_profile(&self) -> Result<Option<UserProfile>> {
        let profile = self
            .conn
            .query_row(
                r"
                SELECT id, vehicle_type, first_name, last_name, phone, identifier,
                       pin, fuel, trial_start_ms, license_expiry_ms
                FROM profile WHERE id = ?1
                ",
                [PROFILE_ID],
                Self::row_to_profile,
            )
            .optional()
            .map_err(|e| decode_error("profile", e))?;
        Ok(profile)
    }

    fn create_profile(&self, profile: &NewProfile) -> Result<UserProfile> {
        let inserted = self.conn.execute(
            r"
            INSERT INTO profile (id, vehicle_type, first_name, last_name, phone, identifier,
                                 pin, fuel, trial_start_ms, license_expiry_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
            params![
                PROFILE_ID,
                profile.vehicle_type,
                profile.first_name,
                profile.last_name,
                profile.phone,
                profile.identifier,
                profile.pin,
                profile.fuel,
                profile.trial_start.timestamp_millis(),
                profile.license_expiry.timestamp_millis(),
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                warn!("Refusing to create a second profile");
                return Err(Error::ProfileExists);
            }
            Err(e) => return Err(e.into()),
        }

        debug!("Created profile for {}", profile.identifier);
        self.get_profile()?
            .ok_or_else(|| Error::internal("profile missing right after insert"))
    }

    fn update_expiry(&self, id: i64, expiry: DateTime<Utc>) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE profile SET license_expiry_ms = ?1 WHERE id = ?2",
            params![expiry.timestamp_millis(), id],
        )?;

        if affected == 0 {
            return Err(Error::ProfileMissing);
        }
        debug!("License expiry set to {}", expiry.to_rfc3339());
        Ok(())
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    /// Whether onboarding has happened.
    pub has_profile: bool,
    /// Number of revenue records.
    pub revenue_records: i64,
    /// Number of expenses.
    pub expense_records: i64,
    /// Number of service records.
    pub maintenance_records: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
