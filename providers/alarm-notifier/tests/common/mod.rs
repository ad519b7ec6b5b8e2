//! Shared fixtures for the alarm notifier integration tests
#![allow(dead_code)]

use alarm_common::{
    Alarm, AlarmTime, Device, DeviceMessage, DispatchResult, Platform, ScheduleEntry, TrashData,
    TrashKind, TrashSchedule, TriggerHandle, User,
};
use alarm_notifier::{
    AlarmStore, InMemoryAlarmStore, InMemoryScheduleResolver, InMemoryTriggerRegistry,
    NotificationTransport, PortResult, TriggerRegistry,
};
use async_trait::async_trait;
use chrono::Weekday;
use std::sync::Arc;
use tokio::sync::{Barrier, Mutex};

pub fn time(hour: u8, minute: u8) -> AlarmTime {
    AlarmTime::new(hour, minute).unwrap()
}

pub fn token(n: usize) -> String {
    format!("d{:04}", n)
}

pub fn alarm(n: usize, at: AlarmTime) -> Alarm {
    Alarm::new(
        Device::new(token(n), Platform::Android),
        at,
        User::new(format!("u{:04}", n)),
    )
}

/// Burnable on Mondays, cans on the first of the month.
pub fn schedule_for(user_id: &str) -> TrashSchedule {
    TrashSchedule {
        user_id: user_id.to_string(),
        trash: vec![
            TrashData::new(TrashKind::Burn, vec![ScheduleEntry::Weekday(Weekday::Mon)]),
            TrashData::new(TrashKind::Can, vec![ScheduleEntry::Month(1)]),
        ],
    }
}

/// Stores `count` alarms at `at` with a schedule for every user.
pub async fn seed(
    store: &InMemoryAlarmStore,
    resolver: &InMemoryScheduleResolver,
    count: usize,
    at: AlarmTime,
) {
    for n in 0..count {
        let alarm = alarm(n, at);
        resolver.insert(schedule_for(&alarm.user().id)).await;
        store.save(&alarm).await.unwrap();
    }
}

/// Transport that records every batch and fails or panics on chosen tokens.
#[derive(Default)]
pub struct RecordingTransport {
    pub batches: Mutex<Vec<Vec<DeviceMessage>>>,
    fail_on: Option<String>,
    panic_on: Option<String>,
}

impl RecordingTransport {
    pub fn failing_on(token: impl Into<String>) -> Self {
        Self {
            fail_on: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn panicking_on(token: impl Into<String>) -> Self {
        Self {
            panic_on: Some(token.into()),
            ..Default::default()
        }
    }

    /// Recorded batches ordered by their first device token.
    pub async fn sorted_batches(&self) -> Vec<Vec<DeviceMessage>> {
        let mut batches = self.batches.lock().await.clone();
        batches.sort_by(|a, b| {
            let first = |batch: &Vec<DeviceMessage>| batch.first().map(|m| m.device.token.clone());
            first(a).cmp(&first(b))
        });
        batches
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn send_to_devices(&self, messages: Vec<DeviceMessage>) -> DispatchResult {
        let contains = |wanted: &Option<String>| {
            wanted
                .as_deref()
                .is_some_and(|t| messages.iter().any(|m| m.device.token == t))
        };
        if contains(&self.panic_on) {
            panic!("push gateway crashed");
        }
        let fail = contains(&self.fail_on);

        self.batches.lock().await.push(messages);
        if fail {
            DispatchResult::failure(vec!["gateway rejected batch".to_string()])
        } else {
            DispatchResult::success()
        }
    }
}

/// Holds every `find_by_time` caller until `parties` callers have looked, so
/// concurrent registrations all observe the same registry state.
pub struct RacingTriggerRegistry {
    pub inner: Arc<InMemoryTriggerRegistry>,
    barrier: Barrier,
}

impl RacingTriggerRegistry {
    pub fn new(inner: Arc<InMemoryTriggerRegistry>, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl TriggerRegistry for RacingTriggerRegistry {
    async fn find_by_time(&self, time: AlarmTime) -> PortResult<Option<TriggerHandle>> {
        let found = self.inner.find_by_time(time).await;
        self.barrier.wait().await;
        found
    }

    async fn create(&self, time: AlarmTime) -> PortResult<()> {
        self.inner.create(time).await
    }
}
