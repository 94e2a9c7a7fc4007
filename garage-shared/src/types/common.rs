//! Value types embedded inside several records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Integer identity assigned by whichever backend owns a record.
///
/// `0` means "not yet assigned" for kinds whose identity is generated by the backend.
pub type RecordId = i32;

/// Reference to a file attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UploadedFile {
    pub name: String,
    pub location: String,
    pub is_pending: bool,
}

/// User-defined field attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExtraField {
    pub name: String,
    pub value: String,
    pub is_required: bool,
}

/// One consumption of a supply by a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SupplyUsageHistory {
    /// Id of the consumed supply record.
    pub id: RecordId,
    pub date: NaiveDate,
    pub part_number: String,
    pub description: String,
    pub quantity: f64,
    pub cost: f64,
}

/// What a reminder is measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderMetric {
    #[default]
    Date,
    Odometer,
    Both,
}

/// Which record kind a finished plan turns into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportMode {
    #[default]
    ServiceRecord,
    RepairRecord,
    UpgradeRecord,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanPriority {
    Critical,
    #[default]
    Normal,
    Low,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanProgress {
    #[default]
    Backlog,
    InProgress,
    Testing,
    Done,
}
