//! Ties each record type to its catalog entry and exposes its key.

use std::fmt::{self, Debug};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::catalog::EntityKind;
use crate::types::*;

/// A storage key in either shape the catalog allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Id(RecordId),
    Pair(UserVehicle),
}

impl From<RecordId> for RecordKey {
    fn from(id: RecordId) -> Self {
        RecordKey::Id(id)
    }
}

impl From<UserVehicle> for RecordKey {
    fn from(pair: UserVehicle) -> Self {
        RecordKey::Pair(pair)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Id(id) => write!(f, "{}", id),
            RecordKey::Pair(pair) => write!(f, "({}, {})", pair.user_id, pair.vehicle_id),
        }
    }
}

/// A persistable record type.
///
/// Records travel through storage in their serialized (PascalCase) form; the
/// catalog entry for [`Entity::KIND`] decides how that form is laid out.
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    type Key: Copy + Eq + Debug + Send + Sync + Into<RecordKey> + 'static;

    const KIND: EntityKind;

    fn key(&self) -> Self::Key;

    /// Stores a backend-assigned identity. Composite-keyed records ignore it.
    fn assign_id(&mut self, _id: RecordId) {}
}

/// A record scoped to a single vehicle.
pub trait OwnedEntity: Entity {
    fn vehicle_id(&self) -> RecordId;
}

macro_rules! identity_entity {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Entity for $ty {
                type Key = RecordId;

                const KIND: EntityKind = EntityKind::$ty;

                fn key(&self) -> RecordId {
                    self.id
                }

                fn assign_id(&mut self, id: RecordId) {
                    self.id = id;
                }
            }
        )*
    };
}

macro_rules! owned_entity {
    ($($ty:ident),* $(,)?) => {
        identity_entity!($($ty),*);
        $(
            impl OwnedEntity for $ty {
                fn vehicle_id(&self) -> RecordId {
                    self.vehicle_id
                }
            }
        )*
    };
}

identity_entity!(Vehicle, UserData, Token, UserConfigData);

owned_entity!(
    CollisionRecord,
    ServiceRecord,
    UpgradeRecord,
    GasRecord,
    Note,
    OdometerRecord,
    ReminderRecord,
    PlanRecord,
    PlanRecordTemplate,
    SupplyRecord,
    TaxRecord,
);

impl Entity for UserAccess {
    type Key = UserVehicle;

    const KIND: EntityKind = EntityKind::UserAccess;

    fn key(&self) -> UserVehicle {
        self.id
    }
}

impl OwnedEntity for UserAccess {
    fn vehicle_id(&self) -> RecordId {
        self.id.vehicle_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_record_serializes_pascal_case() {
        let record = ServiceRecord::new(
            4,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "Oil change",
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["VehicleId"], json!(4));
        assert_eq!(value["Description"], json!("Oil change"));
        assert_eq!(value["Date"], json!("2024-03-01"));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let note: Note = serde_json::from_value(json!({"Id": 9, "VehicleId": 2})).unwrap();
        assert_eq!(note.key(), 9);
        assert_eq!(note.vehicle_id(), 2);
        assert!(note.description.is_empty());
    }

    #[test]
    fn test_user_access_shape() {
        let access = UserAccess::new(3, 7);
        let value = serde_json::to_value(access).unwrap();
        assert_eq!(value, json!({"UserId": 3, "VehicleId": 7}));

        let back: UserAccess = serde_json::from_value(value).unwrap();
        assert_eq!(back.key(), UserVehicle { user_id: 3, vehicle_id: 7 });
        assert_eq!(back.vehicle_id(), 7);
    }

    #[test]
    fn test_assign_id() {
        let mut vehicle = Vehicle::new(2019, "Honda", "Civic");
        assert_eq!(vehicle.key(), 0);
        vehicle.assign_id(12);
        assert_eq!(vehicle.id, 12);

        let mut access = UserAccess::new(1, 1);
        access.assign_id(12);
        assert_eq!(access, UserAccess::new(1, 1));
    }

    #[test]
    fn test_record_key_display() {
        assert_eq!(RecordKey::from(5).to_string(), "5");
        let pair = UserVehicle { user_id: 1, vehicle_id: 2 };
        assert_eq!(RecordKey::from(pair).to_string(), "(1, 2)");
    }

    #[test]
    fn test_kind_constants() {
        assert_eq!(Vehicle::KIND, EntityKind::Vehicle);
        assert_eq!(PlanRecordTemplate::KIND.table(), "planrecordtemplates");
        assert_eq!(UserAccess::KIND, EntityKind::UserAccess);
    }
}
