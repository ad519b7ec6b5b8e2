//! Alarm Notifier
//!
//! Registers per-device daily alarms and, when the trigger for an alarm time
//! fires, fans a notification out to every device registered at that time.
//!
//! - [`AlarmRegistrationService`] keeps alarm records and the shared
//!   per-time triggers consistent.
//! - [`NotificationDispatchService`] resolves, builds and delivers messages in
//!   bounded, independently failing batches.
//!
//! Storage, trigger scheduling, schedule lookup and push delivery are consumed
//! through the traits in [`ports`].

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod notifier;
pub mod ports;
pub mod registration;
pub mod telemetry;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::NotifierConfig;
pub use dispatch::{BatchOutcome, DispatchReport, NotificationDispatchService};
pub use error::{DeleteError, NotifierError, RegisterError, UpdateError};
pub use memory::{InMemoryAlarmStore, InMemoryScheduleResolver, InMemoryTriggerRegistry};
pub use notifier::{AlarmNotifier, NotifierAdapters};
pub use ports::{
    AlarmStore, NotificationTransport, PortError, PortResult, ScheduleResolver, TriggerRegistry,
};
pub use registration::AlarmRegistrationService;

// Re-export Result type for convenience
pub type Result<T> = std::result::Result<T, NotifierError>;
