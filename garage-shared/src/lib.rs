//! # Garage Shared
//!
//! This crate defines the records persisted by the garage application and the
//! entity catalog that describes how each record kind is keyed and laid out in
//! storage. Both storage backends and the migration engine depend on it.

pub mod catalog;
pub mod entity;
pub mod types;

pub use catalog::{Column, EntityKind, Identity, KeyShape, Payload, SqlType, TableSpec, SCHEMA};
pub use entity::{Entity, OwnedEntity, RecordKey};
pub use types::*;
