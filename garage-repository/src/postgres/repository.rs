use std::marker::PhantomData;

use async_trait::async_trait;
use garage_shared::catalog::DATA_COLUMN;
use garage_shared::{
    Column, Entity, OwnedEntity, Payload, RecordId, RecordKey, SqlType, TableSpec, Token,
    UserAccess, UserData,
};
use serde_json::{Map, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::debug;

use crate::document::{self, from_document, FieldValue};
use crate::errors::RepositoryError;
use crate::interfaces::{
    OwnedRecordRepository, RecordRepository, TokenRecordRepository, UserAccessRepository,
    UserRecordRepository,
};

/// What an insert does when a row with the same key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnConflict {
    Fail,
    Update,
}

/// PostgreSQL storage port for records of type `T`.
///
/// The table layout comes from `T`'s catalog entry. Writes that must share a
/// transaction with other work are exposed as `*_tx` methods.
pub struct PostgresRepository<T> {
    pool: sqlx::PgPool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> PostgresRepository<T> {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    fn spec(&self) -> &'static TableSpec {
        T::KIND.spec()
    }

    /// Saves a record inside the caller's transaction. See [`RecordRepository::save`].
    pub async fn save_tx(
        &self,
        record: &T,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<T, RepositoryError> {
        let spec = self.spec();
        let mut document = document::to_document(record)?;
        let key = document::storage_key(record);

        let on_conflict = match key {
            Some(_) => OnConflict::Update,
            None => {
                let id = self.next_id_tx(tx).await?;
                document::stamp_id(&mut document, id)?;
                debug!(table = spec.table, id, "Allocated identity");
                OnConflict::Fail
            }
        };

        insert_query(spec, &document, on_conflict)?
            .build()
            .execute(&mut **tx)
            .await?;
        if let Some(RecordKey::Id(id)) = key {
            if spec.generates_identity() {
                advance_identity_tx(spec, id, tx).await?;
            }
        }
        from_document(document)
    }

    pub async fn delete_tx(
        &self,
        key: T::Key,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<bool, RepositoryError> {
        let spec = self.spec();
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            spec.qualified_table(),
            key_predicate(spec)
        );
        let result = bind_key(sqlx::query(&sql), key.into())
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn next_id_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<RecordId, RepositoryError> {
        let row = sqlx::query("SELECT nextval(pg_get_serial_sequence($1, 'id')) AS id")
            .bind(self.spec().qualified_table())
            .fetch_one(&mut **tx)
            .await?;
        let id: i64 = row.try_get("id")?;
        RecordId::try_from(id)
            .map_err(|_| RepositoryError::ConstraintViolation(format!("identity {} out of range", id)))
    }

    async fn find_where(&self, field: &str, value: FieldValue<'_>) -> Result<Vec<T>, RepositoryError> {
        let spec = self.spec();
        let column = spec.column_for_field(field).ok_or_else(|| {
            RepositoryError::invalid_document(format!("{} has no column for {}", spec.table, field))
        })?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY {}",
            select_list(spec),
            spec.qualified_table(),
            column.name,
            key_order(spec)
        );
        let query = sqlx::query(&sql);
        let query = match value {
            FieldValue::Int(v) => query.bind(v),
            FieldValue::Text(v) => query.bind(v.to_string()),
        };
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row_to_document(spec, row).and_then(from_document))
            .collect()
    }
}

#[async_trait]
impl<T: Entity> RecordRepository<T> for PostgresRepository<T> {
    async fn list(&self) -> Result<Vec<T>, RepositoryError> {
        fetch_documents(&self.pool, self.spec())
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    async fn get(&self, key: T::Key) -> Result<Option<T>, RepositoryError> {
        let spec = self.spec();
        let sql = format!(
            "SELECT {} FROM {} WHERE {}",
            select_list(spec),
            spec.qualified_table(),
            key_predicate(spec)
        );
        let row = bind_key(sqlx::query(&sql), key.into())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| row_to_document(spec, &row).and_then(from_document))
            .transpose()
    }

    async fn save(&self, record: T) -> Result<T, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let saved = self.save_tx(&record, &mut tx).await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn delete(&self, key: T::Key) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let removed = self.delete_tx(key, &mut tx).await?;
        tx.commit().await?;
        Ok(removed)
    }
}

#[async_trait]
impl<T: OwnedEntity> OwnedRecordRepository<T> for PostgresRepository<T> {
    async fn list_by_vehicle(&self, vehicle_id: RecordId) -> Result<Vec<T>, RepositoryError> {
        self.find_where("VehicleId", FieldValue::Int(vehicle_id)).await
    }
}

#[async_trait]
impl UserRecordRepository for PostgresRepository<UserData> {
    async fn get_by_username(&self, user_name: &str) -> Result<Option<UserData>, RepositoryError> {
        let users = self.find_where("UserName", FieldValue::Text(user_name)).await?;
        Ok(users.into_iter().next())
    }

    async fn get_by_email(&self, email_address: &str) -> Result<Option<UserData>, RepositoryError> {
        let users = self
            .find_where("EmailAddress", FieldValue::Text(email_address))
            .await?;
        Ok(users.into_iter().next())
    }
}

#[async_trait]
impl TokenRecordRepository for PostgresRepository<Token> {
    async fn get_by_body(&self, body: &str) -> Result<Option<Token>, RepositoryError> {
        let tokens = self.find_where("Body", FieldValue::Text(body)).await?;
        Ok(tokens.into_iter().next())
    }

    async fn get_by_email(&self, email_address: &str) -> Result<Vec<Token>, RepositoryError> {
        self.find_where("EmailAddress", FieldValue::Text(email_address))
            .await
    }
}

#[async_trait]
impl UserAccessRepository for PostgresRepository<UserAccess> {
    async fn list_by_user(&self, user_id: RecordId) -> Result<Vec<UserAccess>, RepositoryError> {
        self.find_where("UserId", FieldValue::Int(user_id)).await
    }
}

/// Every stored document of the table, in key order.
pub(crate) async fn fetch_documents(
    pool: &sqlx::PgPool,
    spec: &TableSpec,
) -> Result<Vec<Value>, RepositoryError> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_list(spec),
        spec.qualified_table(),
        key_order(spec)
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(|row| row_to_document(spec, row)).collect()
}

/// Inserts `document` at the key it carries, failing if the key is taken.
/// The document is stored as given.
pub(crate) async fn insert_document_tx(
    spec: &TableSpec,
    document: &Value,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
) -> Result<(), RepositoryError> {
    if !document.is_object() {
        return Err(RepositoryError::invalid_document(format!(
            "{} document is not an object",
            spec.table
        )));
    }
    insert_query(spec, document, OnConflict::Fail)?
        .build()
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Points the identity sequence at the largest stored id, so the next
/// generated id follows it. No-op for kinds without a generated identity.
pub(crate) async fn reset_identity_tx(
    spec: &TableSpec,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
) -> Result<(), RepositoryError> {
    if !spec.generates_identity() {
        return Ok(());
    }
    let table = spec.qualified_table();
    // An empty table leaves the sequence uncalled so the first id is 1.
    let sql = format!(
        "SELECT setval(pg_get_serial_sequence($1, 'id'), GREATEST(COALESCE(m.max_id, 1), 1), m.max_id IS NOT NULL) \
         FROM (SELECT MAX(id) AS max_id FROM {}) m",
        table
    );
    sqlx::query(&sql).bind(&table).execute(&mut **tx).await?;
    Ok(())
}

/// Moves the identity sequence up to `id` when a record was stored above it.
/// The sequence never moves back, so ids freed by deletes are not handed out again.
async fn advance_identity_tx(
    spec: &TableSpec,
    id: RecordId,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "SELECT setval(s.seq, $2) \
         FROM (SELECT pg_get_serial_sequence($1, 'id')::regclass AS seq) s \
         WHERE $2 > COALESCE(pg_sequence_last_value(s.seq), 0)",
    )
    .bind(spec.qualified_table())
    .bind(i64::from(id))
    .execute(&mut **tx)
    .await?;
    debug!(table = spec.table, id, "Synced identity with explicit id");
    Ok(())
}

fn select_list(spec: &TableSpec) -> String {
    let mut names: Vec<&str> = spec.columns().iter().map(|c| c.name).collect();
    if spec.payload == Payload::Document {
        names.push(DATA_COLUMN);
    }
    names.join(", ")
}

fn key_order(spec: &TableSpec) -> String {
    let names: Vec<&str> = spec.key_columns().iter().map(|c| c.name).collect();
    names.join(", ")
}

/// `id = $1`, or one equality per column for composite keys.
fn key_predicate(spec: &TableSpec) -> String {
    let clauses: Vec<String> = spec
        .key_columns()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ${}", c.name, i + 1))
        .collect();
    clauses.join(" AND ")
}

fn bind_key<'q>(
    query: Query<'q, Postgres, PgArguments>,
    key: RecordKey,
) -> Query<'q, Postgres, PgArguments> {
    match key {
        RecordKey::Id(id) => query.bind(id),
        RecordKey::Pair(pair) => query.bind(pair.user_id).bind(pair.vehicle_id),
    }
}

/// Builds the single-row insert for `document`, binding every typed column from
/// the document field it mirrors.
fn insert_query(
    spec: &TableSpec,
    document: &Value,
    on_conflict: OnConflict,
) -> Result<QueryBuilder<'static, Postgres>, RepositoryError> {
    let columns = spec.columns();
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) VALUES (",
        spec.qualified_table(),
        select_list(spec)
    ));

    {
        let mut values = builder.separated(", ");
        for column in &columns {
            match column.sql_type {
                SqlType::Int => values.push_bind(document::int_field(document, column.field)?),
                SqlType::Text => values.push_bind(document::text_field(document, column.field)?),
                SqlType::Boolean => values.push_bind(document::bool_field(document, column.field)?),
            };
        }
        if spec.payload == Payload::Document {
            values.push_bind(Json(document.clone()));
        }
        values.push_unseparated(")");
    }

    if on_conflict == OnConflict::Update {
        builder.push(format!(" ON CONFLICT ({}) ", key_order(spec)));
        let mut updates: Vec<String> = columns
            .iter()
            .filter(|c| !spec.key_columns().iter().any(|k| k.name == c.name))
            .map(|c| format!("{name} = EXCLUDED.{name}", name = c.name))
            .collect();
        if spec.payload == Payload::Document {
            updates.push(format!("{name} = EXCLUDED.{name}", name = DATA_COLUMN));
        }
        if updates.is_empty() {
            builder.push("DO NOTHING");
        } else {
            builder.push(format!("DO UPDATE SET {}", updates.join(", ")));
        }
    }

    Ok(builder)
}

/// Rebuilds a record's document from a row: the stored JSON payload (if any)
/// overlaid with every typed column under its document field name.
fn row_to_document(spec: &TableSpec, row: &PgRow) -> Result<Value, RepositoryError> {
    let mut document = match spec.payload {
        Payload::Document => row.try_get::<Json<Value>, _>(DATA_COLUMN)?.0,
        Payload::Columns(_) | Payload::KeyOnly => Value::Object(Map::new()),
    };
    let object = document
        .as_object_mut()
        .ok_or_else(|| RepositoryError::invalid_document(format!("{} payload is not an object", spec.table)))?;

    for column in spec.columns() {
        let value = column_value(column, row)?;
        // Absent rather than null, so the field falls back to its default.
        if !value.is_null() {
            object.insert(column.field.to_string(), value);
        }
    }
    Ok(document)
}

fn column_value(column: &Column, row: &PgRow) -> Result<Value, RepositoryError> {
    let value = match column.sql_type {
        SqlType::Int => row.try_get::<Option<i32>, _>(column.name)?.map(Value::from),
        SqlType::Text => row.try_get::<Option<String>, _>(column.name)?.map(Value::from),
        SqlType::Boolean => row.try_get::<Option<bool>, _>(column.name)?.map(Value::from),
    };
    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_shared::EntityKind;
    use serde_json::json;

    #[test]
    fn test_select_list() {
        assert_eq!(select_list(EntityKind::Vehicle.spec()), "id, data");
        assert_eq!(select_list(EntityKind::Note.spec()), "id, vehicleid, data");
        assert_eq!(
            select_list(EntityKind::UserData.spec()),
            "id, username, emailaddress, password, isadmin"
        );
        assert_eq!(select_list(EntityKind::UserAccess.spec()), "userid, vehicleid");
    }

    #[test]
    fn test_key_predicate() {
        assert_eq!(key_predicate(EntityKind::TaxRecord.spec()), "id = $1");
        assert_eq!(
            key_predicate(EntityKind::UserAccess.spec()),
            "userid = $1 AND vehicleid = $2"
        );
    }

    #[test]
    fn test_plain_insert_sql() {
        let document = json!({"Id": 3, "VehicleId": 1, "Description": "brakes"});
        let builder = insert_query(EntityKind::ServiceRecord.spec(), &document, OnConflict::Fail).unwrap();
        assert_eq!(
            builder.sql(),
            "INSERT INTO app.servicerecords (id, vehicleid, data) VALUES ($1, $2, $3)"
        );
    }

    #[test]
    fn test_upsert_sql() {
        let document = json!({"Id": 1, "Body": "abc", "EmailAddress": "a@b.c"});
        let builder = insert_query(EntityKind::Token.spec(), &document, OnConflict::Update).unwrap();
        assert_eq!(
            builder.sql(),
            "INSERT INTO app.tokenrecords (id, body, emailaddress) VALUES ($1, $2, $3) ON CONFLICT (id) DO UPDATE SET body = EXCLUDED.body, emailaddress = EXCLUDED.emailaddress"
        );
    }

    #[test]
    fn test_access_grant_upsert_is_noop_on_conflict() {
        let document = json!({"UserId": 1, "VehicleId": 2});
        let builder = insert_query(EntityKind::UserAccess.spec(), &document, OnConflict::Update).unwrap();
        assert_eq!(
            builder.sql(),
            "INSERT INTO app.useraccessrecords (userid, vehicleid) VALUES ($1, $2) ON CONFLICT (userid, vehicleid) DO NOTHING"
        );
    }

    #[test]
    fn test_insert_rejects_mistyped_field() {
        let document = json!({"Id": 1, "Body": 5, "EmailAddress": "a@b.c"});
        assert!(insert_query(EntityKind::Token.spec(), &document, OnConflict::Fail).is_err());
    }
}
