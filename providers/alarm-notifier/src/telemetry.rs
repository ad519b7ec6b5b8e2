//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::{NotifierConfig, NotifierError, Result};

/// Installs a global fmt subscriber filtered by `RUST_LOG` plus the configured
/// default directive.
///
/// Returns an error instead of panicking when a global subscriber is already set.
pub fn init_tracing(config: &NotifierConfig) -> Result<()> {
    let directive = config.log_filter.parse().map_err(|e| {
        NotifierError::Telemetry(format!("invalid log_filter '{}': {}", config.log_filter, e))
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .try_init()
        .map_err(|e| NotifierError::Telemetry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        let config = NotifierConfig {
            log_filter: "alarm_notifier=verbose".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            init_tracing(&config),
            Err(NotifierError::Telemetry(_))
        ));
    }

    #[test]
    fn second_init_reports_error() {
        let config = NotifierConfig::default();
        let _ = init_tracing(&config);
        assert!(matches!(
            init_tracing(&config),
            Err(NotifierError::Telemetry(_))
        ));
    }
}
