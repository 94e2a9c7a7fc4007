//! The entity catalog.
//!
//! A static, ordered table describing every record kind the application persists:
//! how it is keyed, which collection/table holds it, and which columns the
//! relational backend materializes. Both storage adapters and the schema
//! initializer are driven from this table rather than from per-kind code.
//!
//! Catalog order is the migration order. Vehicles come first so that owned
//! records are copied after the vehicles they reference; nothing enforces this
//! relationally, it only keeps logs readable.

use std::fmt;

/// Relational namespace holding every table.
pub const SCHEMA: &str = "app";

/// Every record kind, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Vehicle,
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
    UserData,
    Token,
    UserConfigData,
    UserAccess,
}

impl EntityKind {
    pub const ALL: [EntityKind; 16] = [
        EntityKind::Vehicle,
        EntityKind::CollisionRecord,
        EntityKind::ServiceRecord,
        EntityKind::UpgradeRecord,
        EntityKind::GasRecord,
        EntityKind::Note,
        EntityKind::OdometerRecord,
        EntityKind::ReminderRecord,
        EntityKind::PlanRecord,
        EntityKind::PlanRecordTemplate,
        EntityKind::SupplyRecord,
        EntityKind::TaxRecord,
        EntityKind::UserData,
        EntityKind::Token,
        EntityKind::UserConfigData,
        EntityKind::UserAccess,
    ];

    /// Returns the storage layout for this kind.
    pub fn spec(&self) -> &'static TableSpec {
        &CATALOG[*self as usize]
    }

    /// Collection name in the embedded store, which is also the relational table name.
    pub fn table(&self) -> &'static str {
        self.spec().table
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Vehicle => "Vehicle",
            EntityKind::CollisionRecord => "CollisionRecord",
            EntityKind::ServiceRecord => "ServiceRecord",
            EntityKind::UpgradeRecord => "UpgradeRecord",
            EntityKind::GasRecord => "GasRecord",
            EntityKind::Note => "Note",
            EntityKind::OdometerRecord => "OdometerRecord",
            EntityKind::ReminderRecord => "ReminderRecord",
            EntityKind::PlanRecord => "PlanRecord",
            EntityKind::PlanRecordTemplate => "PlanRecordTemplate",
            EntityKind::SupplyRecord => "SupplyRecord",
            EntityKind::TaxRecord => "TaxRecord",
            EntityKind::UserData => "UserData",
            EntityKind::Token => "Token",
            EntityKind::UserConfigData => "UserConfigData",
            EntityKind::UserAccess => "UserAccess",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a kind is keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// Own integer identity, no owner.
    Standalone,
    /// Own integer identity plus the id of the owning vehicle.
    Owned,
    /// No identity; the key is a `(user_id, vehicle_id)` pair.
    Composite,
}

/// Where an integer identity comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// Backend-generated when unset (`0`), but explicit values are accepted.
    GeneratedByDefault,
    /// Always supplied by the caller; `0` is a valid key.
    Assigned,
    /// Composite kinds have no identity column.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Int,
    Text,
    Boolean,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Int => "INT",
            SqlType::Text => "TEXT",
            SqlType::Boolean => "BOOLEAN",
        }
    }
}

/// A typed relational column mirroring one field of the record document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name in the relational table.
    pub name: &'static str,
    /// Field name in the serialized record.
    pub field: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
}

impl Column {
    pub const fn int(name: &'static str, field: &'static str) -> Self {
        Self { name, field, sql_type: SqlType::Int, nullable: false }
    }

    pub const fn text(name: &'static str, field: &'static str) -> Self {
        Self { name, field, sql_type: SqlType::Text, nullable: false }
    }

    pub const fn nullable_boolean(name: &'static str, field: &'static str) -> Self {
        Self { name, field, sql_type: SqlType::Boolean, nullable: true }
    }

    fn definition(&self) -> String {
        if self.nullable {
            format!("{} {}", self.name, self.sql_type.as_sql())
        } else {
            format!("{} {} NOT NULL", self.name, self.sql_type.as_sql())
        }
    }
}

/// How the non-key fields of a record are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// The whole record as one structured document (`data jsonb`).
    Document,
    /// Selected fields as typed columns.
    Columns(&'static [Column]),
    /// Nothing beyond the key columns.
    KeyOnly,
}

/// Identity column of standalone and owned kinds.
pub const ID_COLUMN: Column = Column::int("id", "Id");
/// Owner column of vehicle-owned kinds.
pub const OWNER_COLUMN: Column = Column::int("vehicleid", "VehicleId");
/// Document column of document-payload kinds.
pub const DATA_COLUMN: &str = "data";

const USER_COLUMNS: &[Column] = &[
    Column::text("username", "UserName"),
    Column::text("emailaddress", "EmailAddress"),
    Column::text("password", "Password"),
    Column::nullable_boolean("isadmin", "IsAdmin"),
];

const TOKEN_COLUMNS: &[Column] = &[
    Column::text("body", "Body"),
    Column::text("emailaddress", "EmailAddress"),
];

const ACCESS_KEY_COLUMNS: &[Column] = &[
    Column::int("userid", "UserId"),
    Column::int("vehicleid", "VehicleId"),
];

const IDENTITY_KEY_COLUMNS: &[Column] = &[ID_COLUMN];

/// Storage layout of one record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub kind: EntityKind,
    pub table: &'static str,
    pub key_shape: KeyShape,
    pub identity: Identity,
    pub payload: Payload,
}

impl TableSpec {
    const fn document(kind: EntityKind, table: &'static str, key_shape: KeyShape) -> Self {
        Self { kind, table, key_shape, identity: Identity::GeneratedByDefault, payload: Payload::Document }
    }

    /// Schema-qualified table name, e.g. `app.vehicles`.
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", SCHEMA, self.table)
    }

    /// Columns that make up the primary key.
    pub fn key_columns(&self) -> &'static [Column] {
        match self.key_shape {
            KeyShape::Composite => ACCESS_KEY_COLUMNS,
            KeyShape::Standalone | KeyShape::Owned => IDENTITY_KEY_COLUMNS,
        }
    }

    /// Column holding the owning vehicle's id, if the kind is scoped to a vehicle.
    pub fn owner_column(&self) -> Option<&'static Column> {
        match self.key_shape {
            KeyShape::Owned => Some(&OWNER_COLUMN),
            KeyShape::Composite => ACCESS_KEY_COLUMNS.iter().find(|c| c.name == OWNER_COLUMN.name),
            KeyShape::Standalone => None,
        }
    }

    /// Every typed column in table order: key, owner (for owned kinds), then payload.
    /// The document column of document-payload kinds is not included.
    pub fn columns(&self) -> Vec<&'static Column> {
        let mut columns: Vec<&'static Column> = self.key_columns().iter().collect();
        if self.key_shape == KeyShape::Owned {
            columns.push(&OWNER_COLUMN);
        }
        columns.extend(self.payload_columns().iter());
        columns
    }

    /// Typed payload columns (empty for document and key-only kinds).
    pub fn payload_columns(&self) -> &'static [Column] {
        match self.payload {
            Payload::Columns(columns) => columns,
            Payload::Document | Payload::KeyOnly => &[],
        }
    }

    /// Whether the backend hands out identities for this kind.
    pub fn generates_identity(&self) -> bool {
        self.identity == Identity::GeneratedByDefault
    }

    /// Finds the typed column mirroring a document field, key columns included.
    pub fn column_for_field(&self, field: &str) -> Option<&'static Column> {
        self.columns().into_iter().find(|c| c.field == field)
    }

    /// Renders the idempotent `CREATE TABLE IF NOT EXISTS` statement for this kind.
    pub fn create_table_sql(&self) -> String {
        let mut definitions = Vec::new();
        match self.identity {
            Identity::GeneratedByDefault => {
                definitions.push("id INT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY".to_string())
            }
            Identity::Assigned => definitions.push("id INT PRIMARY KEY".to_string()),
            Identity::None => {}
        }
        if self.key_shape == KeyShape::Owned {
            definitions.push(OWNER_COLUMN.definition());
        }
        match self.payload {
            Payload::Document => definitions.push(format!("{} jsonb NOT NULL", DATA_COLUMN)),
            Payload::Columns(columns) => definitions.extend(columns.iter().map(Column::definition)),
            Payload::KeyOnly => {}
        }
        if self.key_shape == KeyShape::Composite {
            definitions.extend(ACCESS_KEY_COLUMNS.iter().map(Column::definition));
            let names: Vec<&str> = ACCESS_KEY_COLUMNS.iter().map(|c| c.name).collect();
            definitions.push(format!("PRIMARY KEY ({})", names.join(", ")));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.qualified_table(),
            definitions.join(", ")
        )
    }
}

/// Indexed by `EntityKind as usize`; order must match [`EntityKind::ALL`].
static CATALOG: [TableSpec; 16] = [
    TableSpec::document(EntityKind::Vehicle, "vehicles", KeyShape::Standalone),
    TableSpec::document(EntityKind::CollisionRecord, "collisionrecords", KeyShape::Owned),
    TableSpec::document(EntityKind::ServiceRecord, "servicerecords", KeyShape::Owned),
    TableSpec::document(EntityKind::UpgradeRecord, "upgraderecords", KeyShape::Owned),
    TableSpec::document(EntityKind::GasRecord, "gasrecords", KeyShape::Owned),
    TableSpec::document(EntityKind::Note, "notes", KeyShape::Owned),
    TableSpec::document(EntityKind::OdometerRecord, "odometerrecords", KeyShape::Owned),
    TableSpec::document(EntityKind::ReminderRecord, "reminderrecords", KeyShape::Owned),
    TableSpec::document(EntityKind::PlanRecord, "planrecords", KeyShape::Owned),
    TableSpec::document(EntityKind::PlanRecordTemplate, "planrecordtemplates", KeyShape::Owned),
    TableSpec::document(EntityKind::SupplyRecord, "supplyrecords", KeyShape::Owned),
    TableSpec::document(EntityKind::TaxRecord, "taxrecords", KeyShape::Owned),
    TableSpec {
        kind: EntityKind::UserData,
        table: "userrecords",
        key_shape: KeyShape::Standalone,
        identity: Identity::GeneratedByDefault,
        payload: Payload::Columns(USER_COLUMNS),
    },
    TableSpec {
        kind: EntityKind::Token,
        table: "tokenrecords",
        key_shape: KeyShape::Standalone,
        identity: Identity::GeneratedByDefault,
        payload: Payload::Columns(TOKEN_COLUMNS),
    },
    TableSpec {
        kind: EntityKind::UserConfigData,
        table: "userconfigrecords",
        key_shape: KeyShape::Standalone,
        identity: Identity::Assigned,
        payload: Payload::Document,
    },
    TableSpec {
        kind: EntityKind::UserAccess,
        table: "useraccessrecords",
        key_shape: KeyShape::Composite,
        identity: Identity::None,
        payload: Payload::KeyOnly,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_matches_kind_order() {
        for (index, kind) in EntityKind::ALL.iter().enumerate() {
            assert_eq!(CATALOG[index].kind, *kind);
            assert_eq!(kind.spec().kind, *kind);
        }
    }

    #[test]
    fn test_vehicle_comes_first() {
        assert_eq!(EntityKind::ALL[0], EntityKind::Vehicle);
        let first_owned = EntityKind::ALL
            .iter()
            .position(|k| k.spec().key_shape == KeyShape::Owned)
            .unwrap();
        assert!(first_owned > 0);
    }

    #[test]
    fn test_table_names_are_unique() {
        let tables: HashSet<&str> = EntityKind::ALL.iter().map(|k| k.table()).collect();
        assert_eq!(tables.len(), EntityKind::ALL.len());
    }

    #[test]
    fn test_owned_kinds_have_vehicle_owner() {
        let owned: Vec<EntityKind> = EntityKind::ALL
            .iter()
            .copied()
            .filter(|k| k.spec().key_shape == KeyShape::Owned)
            .collect();
        assert_eq!(owned.len(), 11);
        for kind in owned {
            assert_eq!(kind.spec().owner_column(), Some(&OWNER_COLUMN));
            assert_eq!(kind.spec().payload, Payload::Document);
        }
    }

    #[test]
    fn test_vehicle_table_sql() {
        assert_eq!(
            EntityKind::Vehicle.spec().create_table_sql(),
            "CREATE TABLE IF NOT EXISTS app.vehicles (id INT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY, data jsonb NOT NULL)"
        );
    }

    #[test]
    fn test_owned_table_sql() {
        assert_eq!(
            EntityKind::ServiceRecord.spec().create_table_sql(),
            "CREATE TABLE IF NOT EXISTS app.servicerecords (id INT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY, vehicleid INT NOT NULL, data jsonb NOT NULL)"
        );
    }

    #[test]
    fn test_user_table_sql() {
        assert_eq!(
            EntityKind::UserData.spec().create_table_sql(),
            "CREATE TABLE IF NOT EXISTS app.userrecords (id INT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY, username TEXT NOT NULL, emailaddress TEXT NOT NULL, password TEXT NOT NULL, isadmin BOOLEAN)"
        );
    }

    #[test]
    fn test_user_config_uses_assigned_identity() {
        let spec = EntityKind::UserConfigData.spec();
        assert!(!spec.generates_identity());
        assert_eq!(
            spec.create_table_sql(),
            "CREATE TABLE IF NOT EXISTS app.userconfigrecords (id INT PRIMARY KEY, data jsonb NOT NULL)"
        );
    }

    #[test]
    fn test_user_access_composite_key() {
        let spec = EntityKind::UserAccess.spec();
        assert_eq!(spec.key_columns().len(), 2);
        assert_eq!(spec.owner_column().map(|c| c.name), Some("vehicleid"));
        assert_eq!(
            spec.create_table_sql(),
            "CREATE TABLE IF NOT EXISTS app.useraccessrecords (userid INT NOT NULL, vehicleid INT NOT NULL, PRIMARY KEY (userid, vehicleid))"
        );
    }

    #[test]
    fn test_columns_order() {
        let names = |kind: EntityKind| -> Vec<&str> {
            kind.spec().columns().iter().map(|c| c.name).collect()
        };
        assert_eq!(names(EntityKind::Vehicle), vec!["id"]);
        assert_eq!(names(EntityKind::GasRecord), vec!["id", "vehicleid"]);
        assert_eq!(names(EntityKind::Token), vec!["id", "body", "emailaddress"]);
        assert_eq!(names(EntityKind::UserAccess), vec!["userid", "vehicleid"]);
    }

    #[test]
    fn test_column_for_field() {
        let spec = EntityKind::Token.spec();
        assert_eq!(spec.column_for_field("Body").map(|c| c.name), Some("body"));
        assert_eq!(spec.column_for_field("Id").map(|c| c.name), Some("id"));
        assert!(spec.column_for_field("Expired").is_none());

        let notes = EntityKind::Note.spec();
        assert_eq!(notes.column_for_field("VehicleId").map(|c| c.name), Some("vehicleid"));
        assert!(notes.column_for_field("Description").is_none());
    }
}
