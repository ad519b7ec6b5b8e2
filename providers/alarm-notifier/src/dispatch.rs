//! Fan-out of a fired alarm time to every registered device
//!
//! Matching alarms are split into consecutive batches of at most
//! `batch_size`. Each batch runs as its own task: it resolves every user's
//! schedule, builds one message per resolved alarm and makes a single
//! transport call. Batches never wait on or cancel one another, and a failed
//! batch is reported in the logs without affecting the rest.

use alarm_common::{
    Alarm, AlarmTime, DeviceMessage, DispatchResult, ScheduleEvaluator, ScheduleTextBuilder,
};
use chrono::NaiveDate;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::ports::{AlarmStore, NotificationTransport, ScheduleResolver};
use crate::{NotifierConfig, Result};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// What happened to one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub index: usize,
    pub alarm_count: usize,
    pub message_count: usize,
    /// `None` when the batch produced no messages and empty batches are skipped
    pub result: Option<DispatchResult>,
}

impl BatchOutcome {
    pub fn is_failure(&self) -> bool {
        self.result.as_ref().is_some_and(|r| !r.is_success())
    }
}

/// Summary of one `send_message` call, in batch order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub time: AlarmTime,
    pub date: Option<NaiveDate>,
    pub total_alarms: usize,
    pub batches: Vec<BatchOutcome>,
}

impl DispatchReport {
    fn empty(time: AlarmTime) -> Self {
        Self {
            time,
            date: None,
            total_alarms: 0,
            batches: Vec::new(),
        }
    }

    pub fn failed_batches(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.batches.iter().filter(|batch| batch.is_failure())
    }

    pub fn messages_sent(&self) -> usize {
        self.batches
            .iter()
            .filter(|batch| batch.result.as_ref().is_some_and(DispatchResult::is_success))
            .map(|batch| batch.message_count)
            .sum()
    }
}

/// Per-batch work shared by every spawned batch task
struct BatchPipeline {
    schedules: Arc<dyn ScheduleResolver>,
    transport: Arc<dyn NotificationTransport>,
    evaluator: ScheduleEvaluator,
    text: ScheduleTextBuilder,
}

impl BatchPipeline {
    async fn run(
        &self,
        index: usize,
        alarms: Vec<Alarm>,
        today: NaiveDate,
        skip_empty: bool,
    ) -> BatchOutcome {
        // Every resolution settles before the message list is built.
        let resolved = join_all(alarms.iter().map(|alarm| self.resolve(alarm, today))).await;
        let messages: Vec<DeviceMessage> = resolved.into_iter().flatten().collect();
        let message_count = messages.len();

        if messages.is_empty() && skip_empty {
            debug!(batch_index = index, "Batch produced no messages, skipping transport");
            return BatchOutcome {
                index,
                alarm_count: alarms.len(),
                message_count,
                result: None,
            };
        }

        let result = self.transport.send_to_devices(messages).await;
        debug!(
            batch_index = index,
            messages = message_count,
            status = ?result.status,
            "Batch dispatched"
        );

        BatchOutcome {
            index,
            alarm_count: alarms.len(),
            message_count,
            result: Some(result),
        }
    }

    async fn resolve(&self, alarm: &Alarm, today: NaiveDate) -> Option<DeviceMessage> {
        let user_id = alarm.user().id.as_str();
        match self.schedules.find_trash_schedule_by_user_id(user_id).await {
            Ok(Some(schedule)) => {
                let enabled = self.evaluator.enabled_trash(&schedule, today);
                let text = self.text.build(&enabled);
                Some(DeviceMessage::new(alarm.device().clone(), text))
            }
            Ok(None) => {
                warn!(
                    user_id = %user_id,
                    device_token = %alarm.device_token(),
                    "No schedule for user, skipping alarm"
                );
                None
            }
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    device_token = %alarm.device_token(),
                    error = %e,
                    "Schedule lookup failed, skipping alarm"
                );
                None
            }
        }
    }
}

pub struct NotificationDispatchService {
    alarms: Arc<dyn AlarmStore>,
    pipeline: Arc<BatchPipeline>,
    clock: Arc<dyn Clock>,
    batch_size: usize,
    skip_empty_batches: bool,
}

impl NotificationDispatchService {
    pub fn new(
        alarms: Arc<dyn AlarmStore>,
        schedules: Arc<dyn ScheduleResolver>,
        transport: Arc<dyn NotificationTransport>,
        evaluator: ScheduleEvaluator,
        text: ScheduleTextBuilder,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            alarms,
            pipeline: Arc::new(BatchPipeline {
                schedules,
                transport,
                evaluator,
                text,
            }),
            clock,
            batch_size: DEFAULT_BATCH_SIZE,
            skip_empty_batches: false,
        }
    }

    pub fn from_config(
        config: &NotifierConfig,
        alarms: Arc<dyn AlarmStore>,
        schedules: Arc<dyn ScheduleResolver>,
        transport: Arc<dyn NotificationTransport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            alarms,
            schedules,
            transport,
            config.evaluator()?,
            config.text_builder()?,
            clock,
        )
        .with_batch_size(config.batch_size)
        .with_skip_empty_batches(config.skip_empty_batches))
    }

    /// Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_skip_empty_batches(mut self, skip: bool) -> Self {
        self.skip_empty_batches = skip;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Sends today's collection notice to every device with an alarm at `time`.
    ///
    /// Never fails: lookup and delivery problems are logged and reflected in
    /// the returned report.
    pub async fn send_message(&self, time: AlarmTime) -> DispatchReport {
        let alarms = match self.alarms.list_by_alarm_time(time).await {
            Ok(alarms) => alarms,
            Err(e) => {
                warn!(time = %time, error = %e, "Failed to list alarms, nothing dispatched");
                return DispatchReport::empty(time);
            }
        };

        if alarms.is_empty() {
            info!(time = %time, "No alarms registered at this time");
            return DispatchReport::empty(time);
        }

        let today = self.pipeline.evaluator.today(self.clock.now());
        let batch_size = self.batch_size;
        let skip_empty = self.skip_empty_batches;
        let total_alarms = alarms.len();

        let mut sizes = Vec::new();
        let handles: Vec<_> = alarms
            .chunks(batch_size)
            .enumerate()
            .map(|(index, chunk)| {
                sizes.push(chunk.len());
                let pipeline = Arc::clone(&self.pipeline);
                let batch = chunk.to_vec();
                tokio::spawn(async move { pipeline.run(index, batch, today, skip_empty).await })
            })
            .collect();

        info!(
            time = %time,
            date = %today,
            alarms = total_alarms,
            batches = handles.len(),
            "Dispatching notifications"
        );

        let joined = join_all(handles).await;

        let mut batches = Vec::with_capacity(joined.len());
        for (index, outcome) in joined.into_iter().enumerate() {
            let outcome = outcome.unwrap_or_else(|e| BatchOutcome {
                index,
                alarm_count: sizes[index],
                message_count: 0,
                result: Some(DispatchResult::failure(vec![format!(
                    "batch task aborted: {}",
                    e
                )])),
            });

            if let Some(result) = outcome.result.as_ref().filter(|r| !r.is_success()) {
                let (first, last) = ordinal_range(index, batch_size);
                warn!(
                    time = %time,
                    batch_index = index,
                    "Dispatch failed for devices {}..{}: {}",
                    first,
                    last,
                    result.error_messages.join("; ")
                );
            }
            batches.push(outcome);
        }

        let report = DispatchReport {
            time,
            date: Some(today),
            total_alarms,
            batches,
        };
        info!(
            time = %time,
            batches = report.batches.len(),
            failed = report.failed_batches().count(),
            messages_sent = report.messages_sent(),
            "Dispatch complete"
        );
        report
    }
}

/// 1-based inclusive ordinals of the alarms a full batch at `index` covers.
fn ordinal_range(index: usize, batch_size: usize) -> (usize, usize) {
    let first = index * batch_size + 1;
    (first, first + batch_size - 1)
}
