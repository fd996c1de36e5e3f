//! Onboarding, status and activation against a [`ProfileStore`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::code::{CodeScheme, IssuedCode, LicenseDuration};
use super::state::LicenseState;
use crate::clock::{checked_add, Clock};
use crate::config::LicenseConfig;
use crate::error::Result;
use crate::profile::{OnboardingForm, ProfileStore, UserProfile};

/// Outcome of submitting an activation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Activation {
    /// The code matched and the license was extended.
    Extended {
        /// Duration the code unlocked.
        duration: LicenseDuration,
        /// Expiry before activation.
        previous_expiry: DateTime<Utc>,
        /// Expiry now stored.
        new_expiry: DateTime<Utc>,
    },
    /// The code matched no duration. The profile is unchanged.
    InvalidCode,
    /// There is no profile to activate.
    NoProfile,
}

impl Activation {
    /// Whether the license was extended.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extended { .. })
    }
}

/// `max(now, current) + duration`.
///
/// # Errors
///
/// Returns [`crate::Error::ExpiryOutOfRange`] rather than wrapping when the
/// result would pass the end of the calendar.
pub fn extended_expiry(
    current: DateTime<Utc>,
    now: DateTime<Utc>,
    duration: LicenseDuration,
) -> Result<DateTime<Utc>> {
    checked_add(current.max(now), Duration::days(i64::from(duration.days())))
}

/// Licensing operations for one installation.
#[derive(Debug)]
pub struct LicenseManager<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    clock: &'a C,
    scheme: CodeScheme,
    trial: Duration,
    warning_days: u32,
    developer_bypass: bool,
}

impl<'a, S, C> LicenseManager<'a, S, C>
where
    S: ProfileStore + ?Sized,
    C: Clock + ?Sized,
{
    /// Build a manager from license configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured code scheme cannot be built.
    pub fn new(store: &'a S, clock: &'a C, config: &LicenseConfig) -> Result<Self> {
        if config.developer_bypass {
            warn!("Developer bypass is enabled; do not ship this configuration");
        }
        Ok(Self {
            store,
            clock,
            scheme: CodeScheme::from_config(config)?,
            trial: config.trial_length(),
            warning_days: config.warning_days,
            developer_bypass: config.developer_bypass,
        })
    }

    /// The stored profile, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn profile(&self) -> Result<Option<UserProfile>> {
        self.store.get_profile()
    }

    /// Create the installation's profile and start its trial.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or
    /// [`crate::Error::ProfileExists`] if onboarding already happened.
    pub fn onboard(&self, form: OnboardingForm) -> Result<UserProfile> {
        let new_profile =
            form.into_new_profile(self.clock.now(), self.trial, self.developer_bypass)?;
        let profile = self.store.create_profile(&new_profile)?;
        info!(
            "Onboarded {} with license until {}",
            profile.identifier,
            profile.license_expiry.to_rfc3339()
        );
        Ok(profile)
    }

    /// Derive the current license state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn state(&self) -> Result<LicenseState> {
        let profile = self.store.get_profile()?;
        Ok(LicenseState::derive(
            profile.as_ref(),
            self.clock.now(),
            self.warning_days,
        ))
    }

    /// Check an unlock pin against the stored profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn unlock(&self, pin: &str) -> Result<bool> {
        Ok(self
            .store
            .get_profile()?
            .is_some_and(|p| p.unlock(pin, self.developer_bypass)))
    }

    /// Codes for every duration, for manual distribution.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `identifier` is blank.
    pub fn issue_codes(&self, identifier: &str) -> Result<Vec<IssuedCode>> {
        self.scheme.issue_all(identifier)
    }

    /// Submit an activation code.
    ///
    /// Durations are tried in order and the first match wins. The new expiry
    /// is anchored at the later of now and the current expiry, so activating
    /// never shortens the license. Callers should re-read the profile
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the extended expiry is out of
    /// range; a wrong code or a missing profile is reported through
    /// [`Activation`].
    pub fn activate(&self, code: &str) -> Result<Activation> {
        let Some(profile) = self.store.get_profile()? else {
            debug!("Activation attempted without a profile");
            return Ok(Activation::NoProfile);
        };

        let Some(duration) = self.scheme.match_code(&profile.identifier, code.trim()) else {
            info!("Rejected activation code for {}", profile.identifier);
            return Ok(Activation::InvalidCode);
        };

        let now = self.clock.now();
        let new_expiry = extended_expiry(profile.license_expiry, now, duration)?;

        if let Err(e) = self.store.update_expiry(profile.id, new_expiry) {
            error!("Failed to persist license extension: {}", e);
            return Err(e);
        }

        info!(
            "Activated {} days for {}, expiry now {}",
            duration.days(),
            profile.identifier,
            new_expiry.to_rfc3339()
        );
        Ok(Activation::Extended {
            duration,
            previous_expiry: profile.license_expiry,
            new_expiry,
        })
    }
}
