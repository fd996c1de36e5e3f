//! License status derived from the profile and the current time.
//!
//! Nothing here is stored; status is recomputed on every read.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::profile::UserProfile;

/// Milliseconds in a day.
pub const DAY_MILLIS: i64 = 86_400_000;

/// Coarse summary of [`LicenseState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LicensePhase {
    /// Nobody has onboarded yet.
    NoProfile,
    /// More than the warning window remains.
    Active,
    /// Inside the warning window; codes may be entered.
    Expiring,
    /// Lapsed.
    Expired,
}

/// Trial and activation status at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseState {
    /// Whole days left, rounded up, never negative.
    pub days_remaining: i64,
    /// The license has lapsed.
    pub is_trial_expired: bool,
    /// The expiry banner should be shown.
    pub show_warning: bool,
    /// The activation code input should be offered.
    pub can_enter_code: bool,
    /// Current expiry, when a profile exists.
    pub expiry: Option<DateTime<Utc>>,
}

/// `max(0, ceil((expiry - now) / day))` on millisecond timestamps.
#[must_use]
pub fn days_remaining(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let delta = expiry.timestamp_millis() - now.timestamp_millis();
    if delta <= 0 {
        0
    } else {
        (delta + DAY_MILLIS - 1) / DAY_MILLIS
    }
}

impl LicenseState {
    /// Derive the state for `profile` at `now`.
    ///
    /// Without a profile every flag is false and `days_remaining` is zero.
    #[must_use]
    pub fn derive(profile: Option<&UserProfile>, now: DateTime<Utc>, warning_days: u32) -> Self {
        let Some(profile) = profile else {
            return Self {
                days_remaining: 0,
                is_trial_expired: false,
                show_warning: false,
                can_enter_code: false,
                expiry: None,
            };
        };

        let days_remaining = days_remaining(profile.license_expiry, now);
        let is_trial_expired = days_remaining <= 0;
        let show_warning = days_remaining <= i64::from(warning_days);
        let can_enter_code = show_warning || is_trial_expired;

        Self {
            days_remaining,
            is_trial_expired,
            show_warning,
            can_enter_code,
            expiry: Some(profile.license_expiry),
        }
    }

    /// Summarize the flags.
    #[must_use]
    pub fn phase(&self) -> LicensePhase {
        if self.expiry.is_none() {
            LicensePhase::NoProfile
        } else if self.is_trial_expired {
            LicensePhase::Expired
        } else if self.show_warning {
            LicensePhase::Expiring
        } else {
            LicensePhase::Active
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::clock::from_millis;
    use crate::profile::{EngineFuel, VehicleType};

    const EXPIRY: i64 = 1_800_000_000_000;

    fn profile() -> UserProfile {
        UserProfile {
            id: 1,
            vehicle_type: VehicleType::Taxi,
            first_name: "Sami".to_string(),
            last_name: "Ben Ali".to_string(),
            phone: String::new(),
            identifier: "200 TU 5555".to_string(),
            pin: "1234".to_string(),
            fuel: EngineFuel::Essence,
            trial_start: from_millis(EXPIRY) - Duration::days(30),
            license_expiry: from_millis(EXPIRY),
        }
    }

    fn at(now: DateTime<Utc>) -> LicenseState {
        LicenseState::derive(Some(&profile()), now, 5)
    }

    #[test]
    fn test_no_profile() {
        let state = LicenseState::derive(None, Utc::now(), 5);
        assert_eq!(state.days_remaining, 0);
        assert!(!state.is_trial_expired);
        assert!(!state.show_warning);
        assert!(!state.can_enter_code);
        assert_eq!(state.phase(), LicensePhase::NoProfile);
    }

    #[test]
    fn test_four_days_left() {
        let state = at(from_millis(EXPIRY) - Duration::days(4));
        assert_eq!(state.days_remaining, 4);
        assert!(state.show_warning);
        assert!(!state.is_trial_expired);
        assert!(state.can_enter_code);
        assert_eq!(state.phase(), LicensePhase::Expiring);
    }

    #[test]
    fn test_past_expiry() {
        let state = at(from_millis(EXPIRY) + Duration::milliseconds(1));
        assert_eq!(state.days_remaining, 0);
        assert!(state.is_trial_expired);
        assert!(state.show_warning);
        assert!(state.can_enter_code);
        assert_eq!(state.phase(), LicensePhase::Expired);
    }

    #[test]
    fn test_exactly_at_expiry_is_expired() {
        let state = at(from_millis(EXPIRY));
        assert_eq!(state.days_remaining, 0);
        assert!(state.is_trial_expired);
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let state = at(from_millis(EXPIRY) - Duration::milliseconds(1));
        assert_eq!(state.days_remaining, 1);
        assert!(!state.is_trial_expired);

        let state = at(from_millis(EXPIRY) - Duration::days(5) - Duration::hours(1));
        assert_eq!(state.days_remaining, 6);
        assert!(!state.show_warning);
    }

    #[test]
    fn test_warning_boundary() {
        let state = at(from_millis(EXPIRY) - Duration::days(5));
        assert_eq!(state.days_remaining, 5);
        assert!(state.show_warning);

        let state = at(from_millis(EXPIRY) - Duration::days(6));
        assert!(!state.show_warning);
        assert!(!state.can_enter_code);
        assert_eq!(state.phase(), LicensePhase::Active);
    }

    #[test]
    fn test_fresh_trial() {
        let state = at(from_millis(EXPIRY) - Duration::days(30));
        assert_eq!(state.days_remaining, 30);
        assert_eq!(state.expiry, Some(from_millis(EXPIRY)));
    }

    #[test]
    fn test_custom_warning_days() {
        let now = from_millis(EXPIRY) - Duration::days(9);
        assert!(LicenseState::derive(Some(&profile()), now, 10).show_warning);
        assert!(!LicenseState::derive(Some(&profile()), now, 5).show_warning);
    }

    #[test]
    fn test_days_remaining_long_past() {
        assert_eq!(
            days_remaining(from_millis(0), from_millis(EXPIRY)),
            0
        );
    }

    #[test]
    fn test_state_serializes_phase_fields() {
        let json = serde_json::to_string(&at(from_millis(EXPIRY) - Duration::days(4))).unwrap();
        assert!(json.contains("\"days_remaining\":4"));
        assert!(json.contains("\"show_warning\":true"));
    }
}
