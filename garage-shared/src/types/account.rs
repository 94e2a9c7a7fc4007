//! Account records: users, tokens, per-user settings and vehicle access grants.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::RecordId;

/// A login account.
///
/// Stored in typed columns rather than an opaque document because accounts are
/// looked up by user name and email address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserData {
    pub id: RecordId,
    pub user_name: String,
    pub email_address: String,
    /// Password hash.
    pub password: String,
    pub is_admin: bool,
}

/// A registration or password-reset token issued to an email address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Token {
    pub id: RecordId,
    pub body: String,
    pub email_address: String,
}

/// Per-user settings keyed by the owning user's id.
///
/// The settings themselves are kept as a free-form object so that settings this
/// build does not know about survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserConfigData {
    pub id: RecordId,
    pub user_config: Map<String, Value>,
}

/// Composite key of a [`UserAccess`] grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserVehicle {
    pub user_id: RecordId,
    pub vehicle_id: RecordId,
}

/// Grants a user access to a vehicle. Has no identity of its own; the
/// `(user_id, vehicle_id)` pair is the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserAccess {
    #[serde(flatten)]
    pub id: UserVehicle,
}

impl UserAccess {
    pub fn new(user_id: RecordId, vehicle_id: RecordId) -> Self {
        Self {
            id: UserVehicle {
                user_id,
                vehicle_id,
            },
        }
    }
}
