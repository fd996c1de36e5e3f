//! `taxiledger` - Offline revenue, expense and maintenance tracking for taxi operators
//!
//! This library provides the operator profile, the trial and activation-code
//! licensing, the revenue and expense ledger, mileage-based maintenance health,
//! and the `SQLite` storage behind them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

#[macro_use]
mod text_enum;

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod license;
pub mod logging;
pub mod maintenance;
pub mod profile;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use license::{Activation, LicenseManager, LicenseState};
pub use logging::init_logging;
pub use profile::{ProfileStore, UserProfile};
pub use storage::{Storage, StorageStats};
