//! Polling and provisioning configuration
//!
//! Plain structs with defaults suited to managed Kubernetes control planes,
//! which typically take 10-15 minutes to provision. Durations are expressed
//! in (fractional) seconds when deserialized.

use cloud_driver::CloudError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay growth between polls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Always wait `interval`
    Fixed,
    /// Fibonacci growth from `interval` up to `max_interval`
    #[default]
    Fibonacci,
}

/// How the state poller waits for a resource to settle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollConfig {
    #[serde(with = "duration_secs")]
    pub interval: Duration,
    #[serde(with = "duration_secs")]
    pub max_interval: Duration,
    /// Overall deadline for one wait
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub backoff: BackoffStrategy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_interval: Duration::from_secs(60),
            timeout: Duration::from_secs(30 * 60),
            backoff: BackoffStrategy::Fibonacci,
        }
    }
}

impl PollConfig {
    /// Same intervals with a different deadline
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Both the interval and the timeout must be non-zero
    pub fn validate(&self) -> Result<(), CloudError> {
        if self.interval.is_zero() {
            return Err(CloudError::InvalidRequest("poll interval must be greater than zero".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(CloudError::InvalidRequest("poll timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Orchestrator behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvisionConfig {
    /// Waits for clusters and node-groups to become Active
    pub create: PollConfig,
    /// Waits for deletions to be confirmed
    pub delete: PollConfig,
    /// Wait for the cluster to become Active before adding node-groups
    pub wait_for_cluster: bool,
    /// Wait for each node-group to become Active before submitting the next
    pub wait_for_node_groups: bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            create: PollConfig::default(),
            delete: PollConfig::default().with_timeout(Duration::from_secs(20 * 60)),
            wait_for_cluster: true,
            wait_for_node_groups: true,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        let duration = Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)?;
        if duration.is_zero() {
            return Err(serde::de::Error::custom("duration must be greater than zero"));
        }
        Ok(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_wait_for_everything() {
        let config = ProvisionConfig::default();
        assert!(config.wait_for_cluster);
        assert!(config.wait_for_node_groups);
        assert_eq!(config.create.backoff, BackoffStrategy::Fibonacci);
        assert!(config.delete.timeout < config.create.timeout);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ProvisionConfig = serde_json::from_str(
            r#"{"create": {"interval": 0.5, "timeout": 120, "backoff": "fixed"}, "waitForNodeGroups": false}"#,
        )
        .unwrap();

        assert_eq!(config.create.interval, Duration::from_millis(500));
        assert_eq!(config.create.timeout, Duration::from_secs(120));
        assert_eq!(config.create.max_interval, Duration::from_secs(60));
        assert_eq!(config.create.backoff, BackoffStrategy::Fixed);
        assert!(!config.wait_for_node_groups);
        assert!(config.wait_for_cluster);
        assert_eq!(config.delete, ProvisionConfig::default().delete);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let result: Result<PollConfig, _> = serde_json::from_str(r#"{"timeout": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_duration_rejected() {
        for json in [r#"{"interval": 0}"#, r#"{"timeout": 0.0}"#, r#"{"maxInterval": 0}"#] {
            let result: Result<PollConfig, _> = serde_json::from_str(json);
            assert!(result.is_err(), "{json}");
        }
    }

    #[test]
    fn test_validate_zero_interval_and_timeout() {
        assert!(PollConfig::default().validate().is_ok());

        let spinning = PollConfig {
            interval: Duration::ZERO,
            ..PollConfig::default()
        };
        assert!(matches!(spinning.validate(), Err(CloudError::InvalidRequest(_))));

        let no_deadline = PollConfig::default().with_timeout(Duration::ZERO);
        assert!(matches!(no_deadline.validate(), Err(CloudError::InvalidRequest(_))));
    }
}
