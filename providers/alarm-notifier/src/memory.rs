//! In-process implementations of the consumed interfaces
//!
//! Useful for embedding the notifier in a single process and for tests.

use alarm_common::{Alarm, AlarmTime, TrashSchedule, TriggerHandle};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::ports::{AlarmStore, PortResult, ScheduleResolver, TriggerRegistry};

/// Alarms keyed by device token, in registration order per time.
#[derive(Default)]
pub struct InMemoryAlarmStore {
    alarms: RwLock<HashMap<String, (u64, Alarm)>>,
    sequence: AtomicU64,
}

impl InMemoryAlarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.alarms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.alarms.read().await.is_empty()
    }
}

#[async_trait]
impl AlarmStore for InMemoryAlarmStore {
    async fn save(&self, alarm: &Alarm) -> PortResult<()> {
        let mut guard = self.alarms.write().await;
        let seq = match guard.get(alarm.device_token()) {
            Some((seq, _)) => *seq,
            None => self.sequence.fetch_add(1, Ordering::Relaxed),
        };
        guard.insert(alarm.device_token().to_string(), (seq, alarm.clone()));
        Ok(())
    }

    async fn delete(&self, alarm: &Alarm) -> PortResult<()> {
        self.alarms.write().await.remove(alarm.device_token());
        Ok(())
    }

    async fn find_by_device_token(&self, device_token: &str) -> PortResult<Option<Alarm>> {
        let guard = self.alarms.read().await;
        Ok(guard.get(device_token).map(|(_, alarm)| alarm.clone()))
    }

    async fn list_by_alarm_time(&self, time: AlarmTime) -> PortResult<Vec<Alarm>> {
        let guard = self.alarms.read().await;
        let mut matching: Vec<&(u64, Alarm)> = guard
            .values()
            .filter(|(_, alarm)| alarm.time() == time)
            .collect();
        matching.sort_by_key(|(seq, _)| *seq);
        Ok(matching.into_iter().map(|(_, alarm)| alarm.clone()).collect())
    }
}

/// Trigger registry whose `create` is idempotent.
#[derive(Default)]
pub struct InMemoryTriggerRegistry {
    triggers: RwLock<HashMap<AlarmTime, TriggerHandle>>,
    create_calls: AtomicUsize,
}

impl InMemoryTriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `create` calls received, including repeats for a known time.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub async fn times(&self) -> Vec<AlarmTime> {
        let mut times: Vec<AlarmTime> = self.triggers.read().await.keys().copied().collect();
        times.sort();
        times
    }
}

#[async_trait]
impl TriggerRegistry for InMemoryTriggerRegistry {
    async fn find_by_time(&self, time: AlarmTime) -> PortResult<Option<TriggerHandle>> {
        Ok(self.triggers.read().await.get(&time).copied())
    }

    async fn create(&self, time: AlarmTime) -> PortResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.triggers
            .write()
            .await
            .entry(time)
            .or_insert_with(|| TriggerHandle::for_time(time));
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryScheduleResolver {
    schedules: RwLock<HashMap<String, TrashSchedule>>,
}

impl InMemoryScheduleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, schedule: TrashSchedule) {
        self.schedules
            .write()
            .await
            .insert(schedule.user_id.clone(), schedule);
    }
}

#[async_trait]
impl ScheduleResolver for InMemoryScheduleResolver {
    async fn find_trash_schedule_by_user_id(
        &self,
        user_id: &str,
    ) -> PortResult<Option<TrashSchedule>> {
        Ok(self.schedules.read().await.get(user_id).cloned())
    }
}
