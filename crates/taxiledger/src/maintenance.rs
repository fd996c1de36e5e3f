//! Mileage-based maintenance tracking.
//!
//! Every serviced part has a default interval in kilometres. A service record
//! schedules the next one at `mileage + interval`; health compares that with
//! the latest odometer reading.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};

/// A serviceable part with its default interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubSystem {
    /// Stable id stored with service records.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Kilometres between services.
    pub interval_km: u32,
}

/// A group of related parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaintenanceSystem {
    /// Stable id.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Parts in this group.
    pub subsystems: &'static [SubSystem],
}

const fn part(id: &'static str, label: &'static str, interval_km: u32) -> SubSystem {
    SubSystem {
        id,
        label,
        interval_km,
    }
}

/// The static service schedule.
pub const SYSTEMS: &[MaintenanceSystem] = &[
    MaintenanceSystem {
        id: "motorisation",
        label: "Motorisation",
        subsystems: &[
            part("vidange", "Vidange Huile", 10_000),
            part("filtre_huile", "Filtre à Huile", 10_000),
            part("filtre_air", "Filtre à Air", 20_000),
            part("filtre_carburant", "Filtre Carburant", 30_000),
            part("courroie", "Courroie Distribution", 80_000),
            part("bougies", "Bougies", 40_000),
        ],
    },
    MaintenanceSystem {
        id: "refroidissement",
        label: "Refroidissement",
        subsystems: &[
            part("liquide_refroidissement", "Liquide Refroidissement", 40_000),
            part("pompe_eau", "Pompe à Eau", 80_000),
            part("radiateur", "Radiateur", 100_000),
        ],
    },
    MaintenanceSystem {
        id: "freinage",
        label: "Freinage",
        subsystems: &[
            part("plaquettes_av", "Plaquettes AV", 30_000),
            part("plaquettes_ar", "Plaquettes AR", 40_000),
            part("disques", "Disques de Frein", 80_000),
            part("liquide_frein", "Liquide de Frein", 40_000),
        ],
    },
    MaintenanceSystem {
        id: "pneumatique",
        label: "Pneumatique",
        subsystems: &[
            part("pneus_av", "Pneus AV", 40_000),
            part("pneus_ar", "Pneus AR", 40_000),
            part("parallelisme", "Parallélisme", 20_000),
        ],
    },
    MaintenanceSystem {
        id: "suspension",
        label: "Suspension",
        subsystems: &[
            part("amortisseurs_av", "Amortisseurs AV", 80_000),
            part("amortisseurs_ar", "Amortisseurs AR", 80_000),
            part("silentblocs", "Silentblocs", 60_000),
        ],
    },
    MaintenanceSystem {
        id: "transmission",
        label: "Transmission",
        subsystems: &[
            part("embrayage", "Kit Embrayage", 100_000),
            part("huile_boite", "Huile de Boîte", 60_000),
        ],
    },
    MaintenanceSystem {
        id: "electricite",
        label: "Électricité",
        subsystems: &[
            part("batterie", "Batterie", 48_000),
            part("alternateur", "Alternateur", 120_000),
        ],
    },
    MaintenanceSystem {
        id: "climatisation",
        label: "Climatisation",
        subsystems: &[
            part("filtre_habitacle", "Filtre Habitacle", 20_000),
            part("recharge_gaz", "Recharge Gaz", 40_000),
        ],
    },
];

/// Find a part and its system by part id.
#[must_use]
pub fn find_subsystem(id: &str) -> Option<(&'static MaintenanceSystem, &'static SubSystem)> {
    SYSTEMS.iter().find_map(|system| {
        system
            .subsystems
            .iter()
            .find(|s| s.id == id)
            .map(|s| (system, s))
    })
}

/// A completed service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceRecord {
    /// Storage id, `None` until inserted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Service date.
    pub date: NaiveDate,
    /// Odometer at service (km).
    pub mileage: u32,
    /// Serviced part id.
    pub subsystem: String,
    /// Part brand.
    pub brand: String,
    /// Price paid.
    pub price: f64,
}

impl MaintenanceRecord {
    /// Check the record before storing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unknown part id or a negative price.
    pub fn validate(&self) -> Result<()> {
        if find_subsystem(&self.subsystem).is_none() {
            return Err(Error::validation(
                "subsystem",
                format!("unknown part '{}'", self.subsystem),
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::validation("price", "must be a non-negative amount"));
        }
        Ok(())
    }
}

/// Health of a task or system, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    /// Not due yet.
    Ok,
    /// Due within the warning distance.
    Warning,
    /// Overdue.
    Danger,
}

impl Health {
    /// Classify the distance left before a service.
    #[must_use]
    pub fn classify(remaining_km: i64, warning_km: u32) -> Self {
        if remaining_km <= 0 {
            Self::Danger
        } else if remaining_km < i64::from(warning_km) {
            Self::Warning
        } else {
            Self::Ok
        }
    }
}

/// The next scheduled service of one part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskHealth {
    /// Part id.
    pub subsystem: &'static str,
    /// Part label.
    pub label: &'static str,
    /// Odometer reading the service is due at.
    pub next_due_km: i64,
    /// Distance left (negative when overdue).
    pub remaining_km: i64,
    /// Classification of `remaining_km`.
    pub health: Health,
}

/// Aggregated health of one system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemHealth {
    /// System id.
    pub id: &'static str,
    /// System label.
    pub label: &'static str,
    /// Worst task health, `Ok` when nothing is tracked.
    pub health: Health,
    /// Tracked parts.
    pub tasks: Vec<TaskHealth>,
}

impl SystemHealth {
    /// The tracked task with the least distance left.
    #[must_use]
    pub fn most_urgent(&self) -> Option<&TaskHealth> {
        self.tasks.iter().min_by_key(|t| t.remaining_km)
    }
}

/// Assess every system from service history and the current odometer.
///
/// Only the latest service of each part counts; records for unknown parts
/// are ignored.
#[must_use]
pub fn assess(
    records: &[MaintenanceRecord],
    current_mileage: u32,
    warning_km: u32,
) -> Vec<SystemHealth> {
    let mut latest: HashMap<&str, &MaintenanceRecord> = HashMap::new();
    for record in records {
        latest
            .entry(record.subsystem.as_str())
            .and_modify(|seen| {
                if (record.mileage, record.date) > (seen.mileage, seen.date) {
                    *seen = record;
                }
            })
            .or_insert(record);
    }

    SYSTEMS
        .iter()
        .map(|system| {
            let tasks: Vec<TaskHealth> = system
                .subsystems
                .iter()
                .filter_map(|part| {
                    let record = latest.get(part.id)?;
                    let next_due_km = i64::from(record.mileage) + i64::from(part.interval_km);
                    let remaining_km = next_due_km - i64::from(current_mileage);
                    Some(TaskHealth {
                        subsystem: part.id,
                        label: part.label,
                        next_due_km,
                        remaining_km,
                        health: Health::classify(remaining_km, warning_km),
                    })
                })
                .collect();

            let health = tasks.iter().map(|t| t.health).max().unwrap_or(Health::Ok);

            SystemHealth {
                id: system.id,
                label: system.label,
                health,
                tasks,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(subsystem: &str, mileage: u32, day: &str) -> MaintenanceRecord {
        MaintenanceRecord {
            id: None,
            date: day.parse().unwrap(),
            mileage,
            subsystem: subsystem.to_string(),
            brand: "Total".to_string(),
            price: 80.0,
        }
    }

    fn system<'a>(report: &'a [SystemHealth], id: &str) -> &'a SystemHealth {
        report.iter().find(|s| s.id == id).unwrap()
    }

    #[test]
    fn test_table_shape() {
        assert_eq!(SYSTEMS.len(), 8);
        let parts: usize = SYSTEMS.iter().map(|s| s.subsystems.len()).sum();
        assert_eq!(parts, 25);
    }

    #[test]
    fn test_part_ids_unique() {
        let mut ids: Vec<&str> = SYSTEMS
            .iter()
            .flat_map(|s| s.subsystems.iter().map(|p| p.id))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_find_subsystem() {
        let (system, part) = find_subsystem("vidange").unwrap();
        assert_eq!(system.id, "motorisation");
        assert_eq!(part.interval_km, 10_000);
        assert!(find_subsystem("turbo").is_none());
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(Health::classify(0, 500), Health::Danger);
        assert_eq!(Health::classify(-10, 500), Health::Danger);
        assert_eq!(Health::classify(1, 500), Health::Warning);
        assert_eq!(Health::classify(499, 500), Health::Warning);
        assert_eq!(Health::classify(500, 500), Health::Ok);
    }

    #[test]
    fn test_assess_nothing_tracked() {
        let report = assess(&[], 50_000, 500);
        assert_eq!(report.len(), 8);
        assert!(report.iter().all(|s| s.health == Health::Ok && s.tasks.is_empty()));
    }

    #[test]
    fn test_assess_oil_change() {
        let records = vec![service("vidange", 40_000, "2025-01-10")];

        let report = assess(&records, 45_000, 500);
        let engine = system(&report, "motorisation");
        assert_eq!(engine.health, Health::Ok);
        assert_eq!(engine.tasks[0].next_due_km, 50_000);
        assert_eq!(engine.tasks[0].remaining_km, 5_000);

        let report = assess(&records, 49_700, 500);
        assert_eq!(system(&report, "motorisation").health, Health::Warning);

        let report = assess(&records, 50_000, 500);
        assert_eq!(system(&report, "motorisation").health, Health::Danger);
    }

    #[test]
    fn test_latest_service_wins() {
        let records = vec![
            service("vidange", 40_000, "2025-01-10"),
            service("vidange", 50_000, "2025-04-10"),
        ];
        let report = assess(&records, 51_000, 500);
        let engine = system(&report, "motorisation");
        assert_eq!(engine.tasks.len(), 1);
        assert_eq!(engine.tasks[0].next_due_km, 60_000);
        assert_eq!(engine.health, Health::Ok);
    }

    #[test]
    fn test_worst_task_sets_system_health() {
        let records = vec![
            service("plaquettes_av", 10_000, "2025-01-10"),
            service("disques", 10_000, "2025-01-10"),
        ];
        let report = assess(&records, 40_100, 500);
        let brakes = system(&report, "freinage");
        assert_eq!(brakes.health, Health::Danger);
        assert_eq!(brakes.most_urgent().unwrap().subsystem, "plaquettes_av");
    }

    #[test]
    fn test_unknown_records_ignored() {
        let records = vec![service("turbo", 1_000, "2025-01-10")];
        let report = assess(&records, 900_000, 500);
        assert!(report.iter().all(|s| s.tasks.is_empty()));
    }

    #[test]
    fn test_validate_record() {
        assert!(service("batterie", 1, "2025-01-01").validate().is_ok());
        assert!(service("turbo", 1, "2025-01-01").validate().is_err());

        let mut negative = service("batterie", 1, "2025-01-01");
        negative.price = -5.0;
        assert!(negative.validate().is_err());
    }
}
