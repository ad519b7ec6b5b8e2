//! Shared types for the alarm notifier
//!
//! This library provides the alarm value types and the collection schedule
//! rules used to decide what a fired alarm should tell a device.

pub mod schedule;
pub mod text;
pub mod types;

// Re-export commonly used types
pub use schedule::{
    ExcludeDate, ScheduleEntry, ScheduleEntryError, ScheduleEvaluator, TrashData, TrashKind,
    TrashSchedule,
};
pub use text::{Locale, ScheduleTextBuilder};
pub use types::*;
