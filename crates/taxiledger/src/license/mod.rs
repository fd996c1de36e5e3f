//! Trial and activation licensing.
//!
//! - [`code`]: deterministic activation codes per plate and duration.
//! - [`state`]: status derived from the stored expiry and the current time.
//! - [`manager`]: onboarding, activation and unlock against a profile store.
//!
//! # Example
//!
//! ```
//! use taxiledger::clock::FixedClock;
//! use taxiledger::config::LicenseConfig;
//! use taxiledger::license::{Activation, LicenseManager};
//! use taxiledger::profile::{EngineFuel, OnboardingForm, VehicleType};
//! use taxiledger::Storage;
//!
//! let storage = Storage::open_in_memory().unwrap();
//! let clock = FixedClock::at_millis(1_750_000_000_000);
//! let manager = LicenseManager::new(&storage, &clock, &LicenseConfig::default()).unwrap();
//!
//! manager
//!     .onboard(OnboardingForm {
//!         vehicle_type: VehicleType::Taxi,
//!         first_name: "Sami".into(),
//!         last_name: "Ben Ali".into(),
//!         phone: "55123456".into(),
//!         plate: "200 TU 5555".into(),
//!         pin: "1234".into(),
//!         fuel: EngineFuel::Gasoil,
//!     })
//!     .unwrap();
//!
//! let codes = manager.issue_codes("200 TU 5555").unwrap();
//! assert!(manager.activate(&codes[1].code).unwrap().is_success());
//! assert_eq!(manager.activate("00000000").unwrap(), Activation::InvalidCode);
//! ```

pub mod code;
pub mod manager;
pub mod state;

pub use code::{generate_code, CodeScheme, IssuedCode, LicenseDuration};
pub use manager::{Activation, LicenseManager};
pub use state::{LicensePhase, LicenseState};
