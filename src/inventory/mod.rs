//! Checklist logic for a single game: grouping of quantity-prefixed items,
//! completion percentage and the toggle rules that keep item and photo flags
//! consistent.

pub mod aggregation;
pub mod checklist;
pub mod matching;
pub mod ordering;
pub mod progress;

pub use aggregation::{AggregatedGroup, GroupProgress};
pub use checklist::{Checklist, ChecklistError};
pub use ordering::{IndexedItem, SortOrder};
