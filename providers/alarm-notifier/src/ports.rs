//! Interfaces consumed by the core services
//!
//! Implementations live outside this crate (databases, job schedulers, push
//! gateways). [`crate::memory`] carries in-process versions for embedding and
//! tests.

use alarm_common::{Alarm, AlarmTime, DeviceMessage, DispatchResult, TriggerHandle, TrashSchedule};
use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Failure reported by a consumed interface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    /// The backing service could not be reached or timed out
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The backing service refused the operation
    #[error("rejected: {0}")]
    Rejected(String),
}

pub type PortResult<T> = std::result::Result<T, PortError>;

/// Persistence for alarms, keyed by device token.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AlarmStore: Send + Sync {
    /// Inserts or overwrites the alarm of `alarm.device_token()`.
    async fn save(&self, alarm: &Alarm) -> PortResult<()>;

    async fn delete(&self, alarm: &Alarm) -> PortResult<()>;

    async fn find_by_device_token(&self, device_token: &str) -> PortResult<Option<Alarm>>;

    /// All alarms at `time`, in any order.
    async fn list_by_alarm_time(&self, time: AlarmTime) -> PortResult<Vec<Alarm>>;
}

/// Registry of alarm times that have an active scheduling trigger.
///
/// Callers check with `find_by_time` and then `create`; the pair is not
/// atomic, so `create` may be called more than once for the same time under
/// concurrent registration. Implementations should treat a repeated `create`
/// as a no-op.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TriggerRegistry: Send + Sync {
    async fn find_by_time(&self, time: AlarmTime) -> PortResult<Option<TriggerHandle>>;

    async fn create(&self, time: AlarmTime) -> PortResult<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScheduleResolver: Send + Sync {
    async fn find_trash_schedule_by_user_id(
        &self,
        user_id: &str,
    ) -> PortResult<Option<TrashSchedule>>;
}

/// Push delivery. One call per dispatch batch.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn send_to_devices(&self, messages: Vec<DeviceMessage>) -> DispatchResult;
}
