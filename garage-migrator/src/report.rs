//! Outcome of a successful migration.

use std::time::Duration;

use garage_shared::EntityKind;

/// Number of records copied per kind, in the order they were copied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    counts: Vec<(EntityKind, usize)>,
    elapsed: Duration,
}

impl MigrationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: EntityKind, count: usize) {
        self.counts.push((kind, count));
    }

    pub fn finish(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Human-readable summary listing every non-empty table.
    pub fn summary(&self) -> String {
        let copied: Vec<String> = self
            .counts
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(kind, n)| format!("{} {}", n, kind.table()))
            .collect();
        if copied.is_empty() {
            "Data Imported Successfully: no records found".to_string()
        } else {
            format!("Data Imported Successfully: {}", copied.join(", "))
        }
    }
}
