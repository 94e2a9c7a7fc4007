//! Embedded single-file store.
//!
//! Every record kind lives in its own collection: a SQLite table holding the
//! record's key and its JSON document. Collections are created the first time a
//! record is written to them.
mod repository;
mod store;

pub use repository::EmbeddedRepository;
pub use store::EmbeddedStore;
