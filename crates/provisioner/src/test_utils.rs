//! Test utilities for orchestrator tests
//!
//! Builders for specs and a fast-polling orchestrator wired to the in-memory
//! EKS simulator.

use crate::config::{BackoffStrategy, PollConfig, ProvisionConfig};
use crate::orchestrator::Orchestrator;
use cloud_driver::{AwsAdapter, MockEks};
use cluster_model::{ClusterSpec, Iid, NetworkRef, NodeGroupSpec};
use std::sync::Arc;
use std::time::Duration;

/// Poll every few milliseconds with a generous deadline
pub fn fast_poll(timeout: Duration) -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(5),
        timeout,
        backoff: BackoffStrategy::Fibonacci,
    }
}

pub fn test_config() -> ProvisionConfig {
    ProvisionConfig {
        create: fast_poll(Duration::from_secs(5)),
        delete: fast_poll(Duration::from_secs(5)),
        ..ProvisionConfig::default()
    }
}

pub fn test_network() -> NetworkRef {
    NetworkRef {
        vpc: Some(Iid::from_system_id("vpc-0a1b2c3d")),
        subnets: vec![Iid::from_system_id("subnet-0a"), Iid::from_system_id("subnet-0b")],
        security_groups: vec![Iid::from_system_id("sg-0c")],
    }
}

/// Cluster spec with one node-group per name, each scaled 1 / 1 / 2
pub fn cluster_spec(name: &str, node_groups: &[&str]) -> ClusterSpec {
    ClusterSpec {
        name_id: name.to_string(),
        version: Some("1.29".to_string()),
        network: test_network(),
        node_groups: node_groups.iter().map(|ng| NodeGroupSpec::new(*ng, 1, 1, 2)).collect(),
    }
}

/// Simulator with the default roles that settles after two describes
pub fn test_mock() -> MockEks {
    MockEks::with_default_roles().with_stabilization(2).with_deletion(2)
}

pub fn orchestrator(mock: &MockEks) -> Orchestrator {
    orchestrator_with(mock, test_config())
}

pub fn orchestrator_with(mock: &MockEks, config: ProvisionConfig) -> Orchestrator {
    Orchestrator::new(Arc::new(AwsAdapter::new(mock.clone())), config)
}
