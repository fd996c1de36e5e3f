//! The installation's single user profile and the onboarding form that creates it.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::clock::checked_add;
use crate::error::{Error, Result};

/// Expiry granted by the developer bypass.
const BYPASS_DAYS: i64 = 3650;

/// Identifier assigned to bypass profiles.
const BYPASS_IDENTIFIER: &str = "000 TU 0000";

/// First name assigned to bypass profiles.
const BYPASS_FIRST_NAME: &str = "Administrateur";

/// Pin accepted for any profile while the developer bypass is on.
const MASTER_PIN: &str = "0000";

text_enum! {
    /// What kind of vehicle the operator drives.
    pub enum VehicleType {
        /// Urban taxi.
        Taxi => "Taxi",
        /// Intercity shared taxi.
        Louage => "Louage",
    }
}

text_enum! {
    /// Engine fuel configuration declared at onboarding.
    pub enum EngineFuel {
        /// Petrol.
        Essence => "Essence",
        /// Diesel.
        Gasoil => "Gasoil",
        /// Low-sulphur diesel.
        Gasoil50 => "Gasoil 50",
        /// Liquefied petroleum gas.
        Gpl => "GPL",
        /// Battery electric.
        Electrique => "Electrique",
        /// Petrol with an LPG kit.
        EssenceGpl => "Essence + GPL",
        /// Petrol hybrid.
        EssenceElectrique => "Essence + Electrique",
    }
}

/// The stored profile. At most one exists per installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    /// Row id (always 1).
    pub id: i64,
    /// Vehicle kind.
    pub vehicle_type: VehicleType,
    /// Operator first name.
    pub first_name: String,
    /// Operator last name.
    pub last_name: String,
    /// Contact phone.
    pub phone: String,
    /// Vehicle plate, trimmed and uppercased. Activation codes are derived from it.
    pub identifier: String,
    /// Four-digit unlock pin.
    #[serde(skip_serializing)]
    pub pin: String,
    /// Engine fuel.
    pub fuel: EngineFuel,
    /// When the trial started.
    pub trial_start: DateTime<Utc>,
    /// When the license lapses.
    pub license_expiry: DateTime<Utc>,
}

impl UserProfile {
    /// Check an unlock pin.
    ///
    /// `allow_master_pin` additionally accepts `0000`.
    #[must_use]
    pub fn unlock(&self, candidate: &str, allow_master_pin: bool) -> bool {
        let candidate = candidate.trim();
        if candidate == self.pin {
            return true;
        }
        if allow_master_pin && candidate == MASTER_PIN {
            warn!("Profile unlocked with the master pin");
            return true;
        }
        false
    }
}

/// A profile ready to be written; the store assigns the row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    /// Vehicle kind.
    pub vehicle_type: VehicleType,
    /// Operator first name.
    pub first_name: String,
    /// Operator last name.
    pub last_name: String,
    /// Contact phone.
    pub phone: String,
    /// Normalized plate.
    pub identifier: String,
    /// Four-digit pin.
    pub pin: String,
    /// Engine fuel.
    pub fuel: EngineFuel,
    /// Trial start.
    pub trial_start: DateTime<Utc>,
    /// Initial expiry.
    pub license_expiry: DateTime<Utc>,
}

/// Raw onboarding input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingForm {
    /// Vehicle kind.
    pub vehicle_type: VehicleType,
    /// Operator first name.
    pub first_name: String,
    /// Operator last name.
    pub last_name: String,
    /// Contact phone.
    pub phone: String,
    /// Vehicle plate as typed.
    pub plate: String,
    /// Pin as typed.
    pub pin: String,
    /// Engine fuel.
    pub fuel: EngineFuel,
}

fn pin_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{4}$").expect("static regex is valid"))
}

fn is_admin(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("admin")
}

impl OnboardingForm {
    /// True when every text field reads `admin`.
    #[must_use]
    pub fn is_admin_bypass(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.phone,
            &self.plate,
            &self.pin,
        ]
        .into_iter()
        .all(|v| is_admin(v))
    }

    /// Validate the form and build the profile to store.
    ///
    /// The trial runs from `now` for `trial`. With `developer_bypass` on, an
    /// all-`admin` form skips validation and gets a ten-year expiry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty plate or name, or a pin that
    /// is not exactly four digits. Returns [`Error::ExpiryOutOfRange`] if the
    /// trial would end past the representable calendar.
    pub fn into_new_profile(
        self,
        now: DateTime<Utc>,
        trial: Duration,
        developer_bypass: bool,
    ) -> Result<NewProfile> {
        if developer_bypass && self.is_admin_bypass() {
            warn!("Developer bypass used at onboarding");
            return Ok(NewProfile {
                vehicle_type: self.vehicle_type,
                first_name: BYPASS_FIRST_NAME.to_string(),
                last_name: self.last_name.trim().to_string(),
                phone: self.phone.trim().to_string(),
                identifier: BYPASS_IDENTIFIER.to_string(),
                pin: self.pin.trim().to_string(),
                fuel: self.fuel,
                trial_start: now,
                license_expiry: checked_add(now, Duration::days(BYPASS_DAYS))?,
            });
        }

        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            return Err(Error::validation("first_name", "cannot be empty"));
        }
        let last_name = self.last_name.trim();
        if last_name.is_empty() {
            return Err(Error::validation("last_name", "cannot be empty"));
        }
        let identifier = self.plate.trim().to_uppercase();
        if identifier.is_empty() {
            return Err(Error::validation("plate", "cannot be empty"));
        }
        let pin = self.pin.trim();
        if !pin_pattern().is_match(pin) {
            return Err(Error::validation("pin", "must be exactly 4 digits"));
        }

        Ok(NewProfile {
            vehicle_type: self.vehicle_type,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            phone: self.phone.trim().to_string(),
            identifier,
            pin: pin.to_string(),
            fuel: self.fuel,
            trial_start: now,
            license_expiry: checked_add(now, trial)?,
        })
    }
}

/// Persistence collaborator for the profile singleton.
pub trait ProfileStore {
    /// The profile, if onboarding has happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_profile(&self) -> Result<Option<UserProfile>>;

    /// Store the profile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProfileExists`] if a profile is already stored.
    fn create_profile(&self, profile: &NewProfile) -> Result<UserProfile>;

    /// Overwrite the license expiry of profile `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProfileMissing`] if no such profile exists.
    fn update_expiry(&self, id: i64, expiry: DateTime<Utc>) -> Result<()>;
}
