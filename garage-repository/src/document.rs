//! Conversion between records and their stored document form.
//!
//! Both backends persist the serialized record unchanged, so a record read back
//! deserializes to a value equal to the one written.

use garage_shared::{Entity, RecordId, RecordKey};
use serde_json::Value;

use crate::errors::RepositoryError;

/// Scalar compared against a record field in a lookup.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FieldValue<'a> {
    Int(RecordId),
    Text(&'a str),
}

/// Identity field of every identity-keyed document.
pub const ID_FIELD: &str = "Id";

pub fn to_document<T: Entity>(record: &T) -> Result<Value, RepositoryError> {
    let document = serde_json::to_value(record)?;
    if !document.is_object() {
        return Err(RepositoryError::invalid_document(format!(
            "{} did not serialize to an object",
            T::KIND
        )));
    }
    Ok(document)
}

pub fn from_document<T: Entity>(document: Value) -> Result<T, RepositoryError> {
    serde_json::from_value(document).map_err(RepositoryError::from)
}

/// Writes `id` into the document's identity field.
pub fn stamp_id(document: &mut Value, id: RecordId) -> Result<(), RepositoryError> {
    match document.as_object_mut() {
        Some(object) => {
            object.insert(ID_FIELD.to_string(), Value::from(id));
            Ok(())
        }
        None => Err(RepositoryError::invalid_document("document is not an object")),
    }
}

/// The key a record should be stored under, or `None` when the backend must
/// allocate a new identity for it.
pub fn storage_key<T: Entity>(record: &T) -> Option<RecordKey> {
    match record.key().into() {
        RecordKey::Id(0) if T::KIND.spec().generates_identity() => None,
        key => Some(key),
    }
}

/// Reads an integer field, rejecting values outside the identity range.
pub fn int_field(document: &Value, field: &str) -> Result<Option<i32>, RepositoryError> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| {
                RepositoryError::invalid_document(format!("field {} is not a 32-bit integer", field))
            }),
    }
}

pub fn text_field(document: &Value, field: &str) -> Result<Option<String>, RepositoryError> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RepositoryError::invalid_document(format!(
            "field {} is not a string",
            field
        ))),
    }
}

pub fn bool_field(document: &Value, field: &str) -> Result<Option<bool>, RepositoryError> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(RepositoryError::invalid_document(format!(
            "field {} is not a boolean",
            field
        ))),
    }
}
