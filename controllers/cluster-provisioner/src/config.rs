//! Environment configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `PROVIDER` | `aws` |
//! | `PROVIDER_ENDPOINT` | regional endpoint |
//! | `PROVIDER_TOKEN` | required |
//! | `PROVIDER_REGION` | `us-east-1` |
//! | `CLUSTER_ROLE_NAME` / `NODEGROUP_ROLE_NAME` | role naming convention |
//! | `POLL_INTERVAL_SECS` / `POLL_MAX_INTERVAL_SECS` | 10 / 60 |
//! | `CREATE_TIMEOUT_SECS` / `DELETE_TIMEOUT_SECS` | 1800 / 1200 |
//! | `WAIT_FOR_NODE_GROUPS` | `true` |

use crate::error::CliError;
use cloud_driver::{AwsAdapter, EksClient, ProviderAdapter, RoleConvention};
use provisioner::ProvisionConfig;
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Supported provider platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Aws,
}

impl std::str::FromStr for Provider {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" | "eks" => Ok(Self::Aws),
            other => Err(CliError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Resolved CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub endpoint: Option<String>,
    pub token: String,
    pub region: String,
    pub roles: RoleConvention,
    pub provision: ProvisionConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = get("PROVIDER").unwrap_or_else(|| "aws".to_string()).parse()?;
        let token = get("PROVIDER_TOKEN").ok_or_else(|| {
            CliError::InvalidConfig("PROVIDER_TOKEN environment variable is required".to_string())
        })?;

        let default_roles = RoleConvention::default();
        let roles = RoleConvention {
            cluster_role: get("CLUSTER_ROLE_NAME").unwrap_or(default_roles.cluster_role),
            node_group_role: get("NODEGROUP_ROLE_NAME").unwrap_or(default_roles.node_group_role),
        };

        let mut provision = ProvisionConfig::default();
        for poll in [&mut provision.create, &mut provision.delete] {
            if let Some(interval) = seconds(&get, "POLL_INTERVAL_SECS")? {
                poll.interval = interval;
            }
            if let Some(max_interval) = seconds(&get, "POLL_MAX_INTERVAL_SECS")? {
                poll.max_interval = max_interval;
            }
        }
        if let Some(timeout) = seconds(&get, "CREATE_TIMEOUT_SECS")? {
            provision.create.timeout = timeout;
        }
        if let Some(timeout) = seconds(&get, "DELETE_TIMEOUT_SECS")? {
            provision.delete.timeout = timeout;
        }
        if let Some(wait) = get("WAIT_FOR_NODE_GROUPS") {
            provision.wait_for_node_groups = parse_bool("WAIT_FOR_NODE_GROUPS", &wait)?;
        }

        Ok(Self {
            provider,
            endpoint: get("PROVIDER_ENDPOINT"),
            token,
            region: get("PROVIDER_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            roles,
            provision,
        })
    }

    /// Build the adapter for the configured provider
    pub fn adapter(&self) -> Result<Arc<dyn ProviderAdapter>, CliError> {
        match self.provider {
            Provider::Aws => {
                let client = EksClient::new(self.endpoint.clone(), self.token.clone(), self.region.clone())?;
                Ok(Arc::new(AwsAdapter::with_roles(client, self.roles.clone())))
            }
        }
    }
}

fn seconds(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>, CliError> {
    get(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| CliError::InvalidConfig(format!("{key}={value}: {e}")))
                .and_then(|secs| match secs {
                    0 => Err(CliError::InvalidConfig(format!("{key}={value}: must be greater than zero"))),
                    secs => Ok(Duration::from_secs(secs)),
                })
        })
        .transpose()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, CliError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CliError::InvalidConfig(format!("{key}={value}: expected true or false"))),
    }
}
