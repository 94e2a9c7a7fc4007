//! Vehicle record type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{ExtraField, RecordId};

/// A vehicle tracked by the application.
///
/// Every maintenance, financial and planning record is owned by exactly one vehicle
/// through its `vehicle_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Vehicle {
    pub id: RecordId,
    pub image_location: String,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub purchase_date: Option<NaiveDate>,
    pub sold_date: Option<NaiveDate>,
    pub purchase_price: f64,
    pub sold_price: f64,
    pub is_electric: bool,
    pub is_diesel: bool,
    pub use_hours: bool,
    pub odometer_optional: bool,
    pub extra_fields: Vec<ExtraField>,
    pub tags: Vec<String>,
    pub dashboard_metrics: Vec<String>,
}

impl Vehicle {
    /// Create an unsaved vehicle with the identifying fields set.
    pub fn new(year: i32, make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            year,
            make: make.into(),
            model: model.into(),
            ..Default::default()
        }
    }
}
