//! Migration progress.

use std::fmt;

use garage_shared::EntityKind;

/// Where a migration run is.
///
/// Runs move `Idle -> SchemaReady -> Copying(0..) -> Done`, or to `Failed` from
/// any earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrationState {
    #[default]
    Idle,
    SchemaReady,
    /// Copying the kind at this index of [`EntityKind::ALL`].
    Copying(usize),
    Done,
    Failed,
}

impl MigrationState {
    /// The record kind being copied, if any.
    pub fn copying(&self) -> Option<EntityKind> {
        match self {
            MigrationState::Copying(index) => EntityKind::ALL.get(*index).copied(),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MigrationState::Done | MigrationState::Failed)
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.copying() {
            Some(kind) => write!(f, "Copying({})", kind),
            None => write!(f, "{:?}", self),
        }
    }
}
