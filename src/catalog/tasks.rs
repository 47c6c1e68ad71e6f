//! Static task catalog.
//!
//! Packets draw their label and sector from the catalog by cycling through it
//! with `id mod len`, so every entry is shown once per full cycle.

use serde::Serialize;

use super::taxonomy::Sector;

/// A single catalog entry: what a simulated AI output is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskEntry {
    /// Human-readable task description.
    pub label: &'static str,
    /// Sector tag shown next to the label.
    pub sector: Sector,
}

impl TaskEntry {
    /// Creates a new catalog entry.
    pub const fn new(label: &'static str, sector: Sector) -> Self {
        Self { label, sector }
    }
}

/// The default review workload, alternating legal, healthcare and finance.
pub const DEFAULT_TASKS: &[TaskEntry] = &[
    TaskEntry::new("Contract clause review", Sector::Legal),
    TaskEntry::new("Patient intake form", Sector::Healthcare),
    TaskEntry::new("Invoice reconciliation", Sector::Finance),
    TaskEntry::new("NDA classification", Sector::Legal),
    TaskEntry::new("Lab result summary", Sector::Healthcare),
    TaskEntry::new("Expense categorisation", Sector::Finance),
    TaskEntry::new("Compliance check", Sector::Legal),
    TaskEntry::new("Insurance claim entry", Sector::Healthcare),
    TaskEntry::new("Tax filing review", Sector::Finance),
    TaskEntry::new("Deposition tagging", Sector::Legal),
    TaskEntry::new("Prescription validation", Sector::Healthcare),
    TaskEntry::new("Payroll data entry", Sector::Finance),
    TaskEntry::new("Case brief extraction", Sector::Legal),
    TaskEntry::new("Discharge note review", Sector::Healthcare),
    TaskEntry::new("Audit trail check", Sector::Finance),
];

/// Read-only list of task entries used to stamp new packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCatalog {
    entries: Vec<TaskEntry>,
}

impl TaskCatalog {
    /// Creates a catalog from an explicit list of entries.
    pub fn new(entries: Vec<TaskEntry>) -> Self {
        Self { entries }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all entries in catalog order.
    pub fn entries(&self) -> &[TaskEntry] {
        &self.entries
    }

    /// Returns the entry assigned to the packet with the given sequence number.
    ///
    /// Returns `None` only for an empty catalog.
    pub fn entry_for(&self, sequence: u64) -> Option<&TaskEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = (sequence % self.entries.len() as u64) as usize;
        self.entries.get(idx)
    }

    /// Returns the entries belonging to one sector.
    pub fn by_sector(&self, sector: Sector) -> Vec<&TaskEntry> {
        self.entries.iter().filter(|e| e.sector == sector).collect()
    }
}

impl Default for TaskCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_TASKS.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_size() {
        let catalog = TaskCatalog::default();
        assert_eq!(catalog.len(), 15);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_entry_for_cycles() {
        let catalog = TaskCatalog::default();
        let first = catalog.entry_for(0).expect("non-empty catalog");
        assert_eq!(first.label, "Contract clause review");
        assert_eq!(first.sector, Sector::Legal);

        assert_eq!(catalog.entry_for(15), catalog.entry_for(0));
        assert_eq!(catalog.entry_for(31), catalog.entry_for(1));
    }

    #[test]
    fn test_full_cycle_covers_every_entry() {
        let catalog = TaskCatalog::default();
        let labels: std::collections::HashSet<&str> = (0..catalog.len() as u64)
            .filter_map(|i| catalog.entry_for(i))
            .map(|e| e.label)
            .collect();
        assert_eq!(labels.len(), catalog.len());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = TaskCatalog::new(Vec::new());
        assert!(catalog.is_empty());
        assert!(catalog.entry_for(3).is_none());
    }

    #[test]
    fn test_sectors_are_balanced() {
        let catalog = TaskCatalog::default();
        for sector in Sector::all() {
            assert_eq!(catalog.by_sector(sector).len(), 5);
        }
    }
}
