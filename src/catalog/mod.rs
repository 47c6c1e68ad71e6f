//! Task catalog for packet-flow.
//!
//! This module provides the sector taxonomy and the static list of task
//! labels that spawned packets are stamped with.

mod tasks;
mod taxonomy;

pub use tasks::{TaskCatalog, TaskEntry, DEFAULT_TASKS};
pub use taxonomy::Sector;
