//! Core value types for alarm registration and dispatch
//!
//! Everything here is a plain value: equality is structural and nothing is
//! mutated in place once constructed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Push platforms a device can register from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Web,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => write!(f, "iOS"),
            Platform::Android => write!(f, "Android"),
            Platform::Web => write!(f, "Web"),
        }
    }
}

/// A push target. The token is opaque to this crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Device {
    pub token: String,
    pub platform: Platform,
}

impl Device {
    pub fn new(token: impl Into<String>, platform: Platform) -> Self {
        Self {
            token: token.into(),
            platform,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct User {
    pub id: String,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlarmTimeError {
    #[error("hour out of range: {0} (expected 0-23)")]
    HourOutOfRange(u8),

    #[error("minute out of range: {0} (expected 0-59)")]
    MinuteOutOfRange(u8),

    #[error("invalid alarm time '{0}' (expected HH:MM)")]
    InvalidFormat(String),
}

/// Wall-clock time of day. This is the deduplication key for triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlarmTime {
    hour: u8,
    minute: u8,
}

impl AlarmTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, AlarmTimeError> {
        if hour > 23 {
            return Err(AlarmTimeError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(AlarmTimeError::MinuteOutOfRange(minute));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for AlarmTime {
    type Err = AlarmTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AlarmTimeError::InvalidFormat(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for AlarmTime {
    type Error = AlarmTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlarmTime> for String {
    fn from(value: AlarmTime) -> Self {
        value.to_string()
    }
}

/// A device's daily alarm. Identity is the device token: a store holds at
/// most one alarm per device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    device: Device,
    time: AlarmTime,
    user: User,
}

impl Alarm {
    pub fn new(device: Device, time: AlarmTime, user: User) -> Self {
        Self { device, time, user }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn device_token(&self) -> &str {
        &self.device.token
    }

    pub fn time(&self) -> AlarmTime {
        self.time
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Returns a new alarm for the same device and user at `new_time`.
    pub fn update(&self, new_time: AlarmTime) -> Alarm {
        Alarm {
            device: self.device.clone(),
            time: new_time,
            user: self.user.clone(),
        }
    }
}

/// Opaque handle for a scheduling trigger registered at one alarm time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerHandle {
    pub id: Uuid,
    pub time: AlarmTime,
}

impl TriggerHandle {
    /// Deterministic handle so independent registries agree on identity.
    pub fn for_time(time: AlarmTime) -> Self {
        let input = format!("alarm-trigger:{}", time);
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, input.as_bytes()),
            time,
        }
    }
}

/// Text to deliver to one device. Built per dispatch, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMessage {
    pub device: Device,
    pub text: String,
}

impl DeviceMessage {
    pub fn new(device: Device, text: impl Into<String>) -> Self {
        Self {
            device,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchStatus {
    Success,
    Failure,
}

/// Outcome of one transport call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchResult {
    pub status: DispatchStatus,
    #[serde(default)]
    pub error_messages: Vec<String>,
}

impl DispatchResult {
    pub fn success() -> Self {
        Self {
            status: DispatchStatus::Success,
            error_messages: Vec::new(),
        }
    }

    pub fn failure(error_messages: Vec<String>) -> Self {
        Self {
            status: DispatchStatus::Failure,
            error_messages,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DispatchStatus::Success
    }
}
