//! This module defines and re-exports the storage port traits.
//! Both the embedded and the PostgreSQL backends implement them identically.
mod records;
mod source;

pub use records::{
    OwnedRecordRepository, RecordRepository, TokenRecordRepository, UserAccessRepository,
    UserRecordRepository,
};
pub use source::RecordSource;
