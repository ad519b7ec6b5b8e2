//! Configuration for the Alarm Notifier

use alarm_common::{Locale, ScheduleEvaluator, ScheduleTextBuilder};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{NotifierError, Result};

const ENV_PREFIX: &str = "ALARM_NOTIFIER_";
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Configuration for the Alarm Notifier
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Maximum number of alarms delivered per transport call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Locale for notification text (`ja` or `en`)
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Offset from UTC used to decide the dispatch date
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    /// Skip the transport call for batches that produced no messages
    #[serde(default)]
    pub skip_empty_batches: bool,

    /// Default tracing filter directive, extended by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl NotifierConfig {
    /// Load configuration from `ALARM_NOTIFIER_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Same as [`from_env`](Self::from_env) over an explicit variable set
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from host-supplied properties
    ///
    /// Missing keys fall back to defaults; present but unparsable values are
    /// rejected rather than silently replaced.
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self> {
        let batch_size = match props.get("batch_size") {
            Some(v) => v.trim().parse().map_err(|e| {
                NotifierError::Configuration(format!("invalid batch_size '{}': {}", v, e))
            })?,
            None => default_batch_size(),
        };

        let locale = props
            .get("locale")
            .cloned()
            .unwrap_or_else(default_locale);

        let utc_offset_minutes = match props.get("utc_offset_minutes") {
            Some(v) => v.trim().parse().map_err(|e| {
                NotifierError::Configuration(format!("invalid utc_offset_minutes '{}': {}", v, e))
            })?,
            None => default_utc_offset_minutes(),
        };

        let skip_empty_batches = match props.get("skip_empty_batches") {
            Some(v) => v.trim().parse().map_err(|e| {
                NotifierError::Configuration(format!("invalid skip_empty_batches '{}': {}", v, e))
            })?,
            None => false,
        };

        let log_filter = props
            .get("log_filter")
            .cloned()
            .unwrap_or_else(default_log_filter);

        let config = Self {
            batch_size,
            locale,
            utc_offset_minutes,
            skip_empty_batches,
            log_filter,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(NotifierError::Configuration(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        self.parsed_locale()?;
        self.offset()?;
        Ok(())
    }

    pub fn parsed_locale(&self) -> Result<Locale> {
        self.locale
            .parse::<Locale>()
            .map_err(NotifierError::Configuration)
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(NotifierError::Configuration(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            NotifierError::Configuration(format!(
                "invalid utc_offset_minutes: {}",
                self.utc_offset_minutes
            ))
        })
    }

    pub fn evaluator(&self) -> Result<ScheduleEvaluator> {
        Ok(ScheduleEvaluator::new(self.offset()?))
    }

    pub fn text_builder(&self) -> Result<ScheduleTextBuilder> {
        Ok(ScheduleTextBuilder::new(self.parsed_locale()?))
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            batch_size: 500,
            locale: "ja".to_string(),
            utc_offset_minutes: 540, // JST
            skip_empty_batches: false,
            log_filter: "alarm_notifier=info".to_string(),
        }
    }
}

fn default_batch_size() -> usize {
    500
}

fn default_locale() -> String {
    "ja".to_string()
}

fn default_utc_offset_minutes() -> i32 {
    540
}

fn default_log_filter() -> String {
    "alarm_notifier=info".to_string()
}
