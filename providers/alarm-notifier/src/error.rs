//! Error types for the Alarm Notifier
//!
//! Each registration operation has its own error type. Variants separate the
//! expected business outcome (`NotFound`) from storage and trigger failures so
//! callers can map them to different responses.

use alarm_common::AlarmTime;
use thiserror::Error;

use crate::ports::PortError;

#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("Trigger unavailable for {time}: {source}")]
    TriggerUnavailable {
        time: AlarmTime,
        #[source]
        source: PortError,
    },

    #[error("Failed to save alarm for device {device_token}: {source}")]
    SaveFailed {
        device_token: String,
        #[source]
        source: PortError,
    },
}

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Alarm not found for device {device_token}")]
    NotFound { device_token: String },

    #[error("Alarm lookup failed for device {device_token}: {source}")]
    StoreUnavailable {
        device_token: String,
        #[source]
        source: PortError,
    },

    #[error("Trigger unavailable for {time}: {source}")]
    TriggerUnavailable {
        time: AlarmTime,
        #[source]
        source: PortError,
    },

    #[error("Failed to save alarm for device {device_token}: {source}")]
    SaveFailed {
        device_token: String,
        #[source]
        source: PortError,
    },
}

impl UpdateError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpdateError::NotFound { .. })
    }
}

#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("Alarm not found for device {device_token}")]
    NotFound { device_token: String },

    #[error("Alarm lookup failed for device {device_token}: {source}")]
    StoreUnavailable {
        device_token: String,
        #[source]
        source: PortError,
    },

    #[error("Failed to delete alarm for device {device_token}: {source}")]
    DeleteFailed {
        device_token: String,
        #[source]
        source: PortError,
    },
}

impl DeleteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DeleteError::NotFound { .. })
    }
}

/// Bootstrap errors: configuration and logging setup
#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Environment configuration error: {0}")]
    Environment(#[from] envy::Error),

    #[error("Telemetry initialization error: {0}")]
    Telemetry(String),
}
