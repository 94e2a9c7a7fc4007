//! Records owned by a vehicle.
//!
//! Each record carries the id of the vehicle it belongs to. The relationship is
//! maintained by the application, not by a database constraint.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::common::{
    ExtraField, ImportMode, PlanPriority, PlanProgress, RecordId, ReminderMetric,
    SupplyUsageHistory, UploadedFile,
};

/// Declares a dated, costed maintenance record. Collision, service and upgrade
/// records share this shape but are persisted in separate collections.
macro_rules! maintenance_record {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "PascalCase", default)]
        pub struct $name {
            pub id: RecordId,
            pub vehicle_id: RecordId,
            pub date: NaiveDate,
            pub mileage: i32,
            pub description: String,
            pub cost: f64,
            pub notes: String,
            pub files: Vec<UploadedFile>,
            pub tags: Vec<String>,
            pub extra_fields: Vec<ExtraField>,
            pub requisition_history: Vec<SupplyUsageHistory>,
        }

        impl $name {
            /// Create an unsaved record for the given vehicle.
            pub fn new(vehicle_id: RecordId, date: NaiveDate, description: impl Into<String>) -> Self {
                Self {
                    vehicle_id,
                    date,
                    description: description.into(),
                    ..Default::default()
                }
            }
        }
    };
}

maintenance_record!(
    /// Repair work following damage or breakdown.
    CollisionRecord
);
maintenance_record!(
    /// Scheduled or routine service work.
    ServiceRecord
);
maintenance_record!(
    /// Modifications and upgrades.
    UpgradeRecord
);

/// A fuel-up (or charge, for electric vehicles).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GasRecord {
    pub id: RecordId,
    pub vehicle_id: RecordId,
    pub date: NaiveDate,
    pub mileage: i32,
    pub gallons: f64,
    pub cost: f64,
    pub is_fill_to_full: bool,
    pub missed_fuel_up: bool,
    pub notes: String,
    pub files: Vec<UploadedFile>,
    pub tags: Vec<String>,
    pub extra_fields: Vec<ExtraField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Note {
    pub id: RecordId,
    pub vehicle_id: RecordId,
    pub description: String,
    pub note_text: String,
    pub pinned: bool,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OdometerRecord {
    pub id: RecordId,
    pub vehicle_id: RecordId,
    pub date: NaiveDate,
    pub initial_mileage: i32,
    pub mileage: i32,
    pub notes: String,
    pub files: Vec<UploadedFile>,
    pub tags: Vec<String>,
    pub extra_fields: Vec<ExtraField>,
}

/// A reminder that fires on a date, an odometer reading, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReminderRecord {
    pub id: RecordId,
    pub vehicle_id: RecordId,
    pub date: NaiveDate,
    pub mileage: i32,
    pub description: String,
    pub notes: String,
    pub is_recurring: bool,
    pub use_custom_thresholds: bool,
    pub custom_thresholds: Vec<i32>,
    pub reminder_mileage_interval: i32,
    pub reminder_month_interval: i32,
    pub custom_mileage_interval: i32,
    pub custom_month_interval: i32,
    pub metric: ReminderMetric,
    pub tags: Vec<String>,
}

/// Declares a planner card. Plans and their reusable templates share this shape.
macro_rules! plan_record {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "PascalCase", default)]
        pub struct $name {
            pub id: RecordId,
            pub vehicle_id: RecordId,
            pub reminder_record_id: RecordId,
            pub date_created: NaiveDateTime,
            pub date_modified: NaiveDateTime,
            pub description: String,
            pub notes: String,
            pub files: Vec<UploadedFile>,
            pub import_mode: ImportMode,
            pub priority: PlanPriority,
            pub progress: PlanProgress,
            pub cost: f64,
            pub extra_fields: Vec<ExtraField>,
            pub requisition_history: Vec<SupplyUsageHistory>,
        }
    };
}

plan_record!(
    /// Planned work tracked on the planner board.
    PlanRecord
);
plan_record!(
    /// A reusable starting point for new plan records.
    PlanRecordTemplate
);

/// Parts and consumables in stock. Shop supplies use vehicle id `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SupplyRecord {
    pub id: RecordId,
    pub vehicle_id: RecordId,
    pub date: NaiveDate,
    pub part_number: String,
    pub part_supplier: String,
    pub quantity: f64,
    pub description: String,
    pub cost: f64,
    pub notes: String,
    pub files: Vec<UploadedFile>,
    pub tags: Vec<String>,
    pub extra_fields: Vec<ExtraField>,
    pub requisition_history: Vec<SupplyUsageHistory>,
}

/// Registration fees, taxes and other recurring costs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaxRecord {
    pub id: RecordId,
    pub vehicle_id: RecordId,
    pub date: NaiveDate,
    pub description: String,
    pub cost: f64,
    pub notes: String,
    pub is_recurring: bool,
    pub recurring_interval: i32,
    pub custom_month_interval: i32,
    pub files: Vec<UploadedFile>,
    pub tags: Vec<String>,
    pub extra_fields: Vec<ExtraField>,
}
