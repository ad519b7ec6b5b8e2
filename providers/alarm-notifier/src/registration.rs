//! Alarm lifecycle: register, update, delete
//!
//! Every alarm time in use has a trigger in the [`TriggerRegistry`]. Triggers
//! are created lazily the first time a time is used and are never removed
//! here, even when the last alarm at a time goes away.

use alarm_common::{Alarm, AlarmTime, Device, User};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{DeleteError, RegisterError, UpdateError};
use crate::ports::{AlarmStore, PortError, TriggerRegistry};

pub struct AlarmRegistrationService {
    alarms: Arc<dyn AlarmStore>,
    triggers: Arc<dyn TriggerRegistry>,
}

impl AlarmRegistrationService {
    pub fn new(alarms: Arc<dyn AlarmStore>, triggers: Arc<dyn TriggerRegistry>) -> Self {
        Self { alarms, triggers }
    }

    /// Registers an alarm for `device`, creating the trigger for `time` if needed.
    ///
    /// The trigger is not rolled back if saving the alarm fails.
    pub async fn register(
        &self,
        device: Device,
        time: AlarmTime,
        user: User,
    ) -> Result<Alarm, RegisterError> {
        let alarm = Alarm::new(device, time, user);

        self.ensure_trigger(time)
            .await
            .map_err(|source| RegisterError::TriggerUnavailable { time, source })?;

        self.alarms
            .save(&alarm)
            .await
            .map_err(|source| RegisterError::SaveFailed {
                device_token: alarm.device_token().to_string(),
                source,
            })?;

        info!(
            device_token = %alarm.device_token(),
            time = %time,
            "Alarm registered"
        );
        Ok(alarm)
    }

    /// Moves the alarm of `device_token` to `new_time`.
    ///
    /// The trigger at the previous time is left in place.
    pub async fn update(
        &self,
        device_token: &str,
        new_time: AlarmTime,
    ) -> Result<Alarm, UpdateError> {
        let existing = self
            .alarms
            .find_by_device_token(device_token)
            .await
            .map_err(|source| UpdateError::StoreUnavailable {
                device_token: device_token.to_string(),
                source,
            })?
            .ok_or_else(|| UpdateError::NotFound {
                device_token: device_token.to_string(),
            })?;

        let updated = existing.update(new_time);

        self.ensure_trigger(new_time)
            .await
            .map_err(|source| UpdateError::TriggerUnavailable {
                time: new_time,
                source,
            })?;

        self.alarms
            .save(&updated)
            .await
            .map_err(|source| UpdateError::SaveFailed {
                device_token: device_token.to_string(),
                source,
            })?;

        info!(
            device_token = %device_token,
            from = %existing.time(),
            to = %new_time,
            "Alarm updated"
        );
        Ok(updated)
    }

    /// Removes the alarm of `device_token`. Triggers are untouched.
    pub async fn delete(&self, device_token: &str) -> Result<(), DeleteError> {
        let alarm = self
            .alarms
            .find_by_device_token(device_token)
            .await
            .map_err(|source| DeleteError::StoreUnavailable {
                device_token: device_token.to_string(),
                source,
            })?
            .ok_or_else(|| DeleteError::NotFound {
                device_token: device_token.to_string(),
            })?;

        self.alarms
            .delete(&alarm)
            .await
            .map_err(|source| DeleteError::DeleteFailed {
                device_token: device_token.to_string(),
                source,
            })?;

        info!(device_token = %device_token, time = %alarm.time(), "Alarm deleted");
        Ok(())
    }

    /// Check-then-create. Two calls, not atomic: concurrent callers may both
    /// see no trigger and both call `create`.
    async fn ensure_trigger(&self, time: AlarmTime) -> Result<(), PortError> {
        if let Some(handle) = self.triggers.find_by_time(time).await? {
            debug!(time = %time, trigger_id = %handle.id, "Trigger already exists");
            return Ok(());
        }

        self.triggers.create(time).await.map_err(|e| {
            warn!(time = %time, error = %e, "Trigger creation failed");
            e
        })?;
        info!(time = %time, "Trigger created");
        Ok(())
    }
}
