//! `SQLite` schema definitions for taxiledger.

/// The profile singleton. The `CHECK` keeps it to a single row.
pub const CREATE_PROFILE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS profile (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    vehicle_type TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    phone TEXT NOT NULL,
    identifier TEXT NOT NULL,
    pin TEXT NOT NULL,
    fuel TEXT NOT NULL,
    trial_start_ms INTEGER NOT NULL,
    license_expiry_ms INTEGER NOT NULL
)
";

/// Daily revenue records.
pub const CREATE_REVENUE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS revenue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    shift TEXT NOT NULL,
    gross_amount REAL NOT NULL,
    fuel_amount REAL NOT NULL,
    fuel_cost REAL NOT NULL,
    fuel_types TEXT NOT NULL DEFAULT '[]',
    other_expenses REAL NOT NULL DEFAULT 0,
    mileage_start INTEGER NOT NULL,
    mileage_end INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// Index on revenue date for recency queries.
pub const CREATE_REVENUE_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_revenue_date ON revenue(date DESC)
";

/// Recurring expenses.
pub const CREATE_EXPENSES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    category TEXT NOT NULL,
    amount REAL NOT NULL,
    frequency TEXT NOT NULL,
    expiry_date TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// Index on expense category.
pub const CREATE_EXPENSES_CATEGORY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category)
";

/// Index on expense expiry for reminders.
pub const CREATE_EXPENSES_EXPIRY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_expenses_expiry ON expenses(expiry_date)
";

/// Service history.
pub const CREATE_MAINTENANCE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS maintenance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    mileage INTEGER NOT NULL,
    subsystem TEXT NOT NULL,
    brand TEXT NOT NULL DEFAULT '',
    price REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// Index on service date.
pub const CREATE_MAINTENANCE_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_maintenance_date ON maintenance(date DESC)
";

/// Index on serviced part.
pub const CREATE_MAINTENANCE_SUBSYSTEM_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_maintenance_subsystem ON maintenance(subsystem)
";

/// Key-value metadata (schema version).
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PROFILE_TABLE,
    CREATE_REVENUE_TABLE,
    CREATE_REVENUE_DATE_INDEX,
    CREATE_EXPENSES_TABLE,
    CREATE_EXPENSES_CATEGORY_INDEX,
    CREATE_EXPENSES_EXPIRY_INDEX,
    CREATE_MAINTENANCE_TABLE,
    CREATE_MAINTENANCE_DATE_INDEX,
    CREATE_MAINTENANCE_SUBSYSTEM_INDEX,
    CREATE_METADATA_TABLE,
];
