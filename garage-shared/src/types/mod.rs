//! This module defines the record types persisted by the garage application.
//! It re-exports the vehicle, maintenance and account records.

pub mod account;
pub mod common;
pub mod records;
pub mod vehicle;

pub use account::{Token, UserAccess, UserConfigData, UserData, UserVehicle};
pub use common::{
    ExtraField, ImportMode, PlanPriority, PlanProgress, RecordId, ReminderMetric,
    SupplyUsageHistory, UploadedFile,
};
pub use records::{
    CollisionRecord, GasRecord, Note, OdometerRecord, PlanRecord, PlanRecordTemplate,
    ReminderRecord, ServiceRecord, SupplyRecord, TaxRecord, UpgradeRecord,
};
pub use vehicle::Vehicle;
