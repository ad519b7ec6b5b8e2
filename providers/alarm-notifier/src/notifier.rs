use std::sync::Arc;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::ports::{AlarmStore, NotificationTransport, ScheduleResolver, TriggerRegistry};
use crate::{AlarmRegistrationService, NotificationDispatchService, NotifierConfig, Result};

/// External collaborators injected at startup
#[derive(Clone)]
pub struct NotifierAdapters {
    pub alarms: Arc<dyn AlarmStore>,
    pub triggers: Arc<dyn TriggerRegistry>,
    pub schedules: Arc<dyn ScheduleResolver>,
    pub transport: Arc<dyn NotificationTransport>,
    pub clock: Arc<dyn Clock>,
}

impl NotifierAdapters {
    /// Adapters using the system clock.
    pub fn new(
        alarms: Arc<dyn AlarmStore>,
        triggers: Arc<dyn TriggerRegistry>,
        schedules: Arc<dyn ScheduleResolver>,
        transport: Arc<dyn NotificationTransport>,
    ) -> Self {
        Self {
            alarms,
            triggers,
            schedules,
            transport,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Registration and dispatch services sharing one alarm store
pub struct AlarmNotifier {
    config: NotifierConfig,
    registration: AlarmRegistrationService,
    dispatch: NotificationDispatchService,
}

impl AlarmNotifier {
    pub fn new(config: NotifierConfig, adapters: NotifierAdapters) -> Result<Self> {
        config.validate()?;
        info!(
            batch_size = config.batch_size,
            locale = %config.locale,
            utc_offset_minutes = config.utc_offset_minutes,
            "Initializing Alarm Notifier"
        );

        let registration =
            AlarmRegistrationService::new(adapters.alarms.clone(), adapters.triggers);
        let dispatch = NotificationDispatchService::from_config(
            &config,
            adapters.alarms,
            adapters.schedules,
            adapters.transport,
            adapters.clock,
        )?;

        Ok(Self {
            config,
            registration,
            dispatch,
        })
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    pub fn registration(&self) -> &AlarmRegistrationService {
        &self.registration
    }

    pub fn dispatch(&self) -> &NotificationDispatchService {
        &self.dispatch
    }
}
