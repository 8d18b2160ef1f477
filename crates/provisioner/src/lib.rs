//! Cluster Provisioner
//!
//! Provider-agnostic orchestration of managed Kubernetes clusters: creates a
//! cluster and its node-groups in order, waits for resources to settle with
//! a reusable [`StatePoller`], and rebuilds every snapshot from live provider
//! state through a [`ProviderAdapter`](cloud_driver::ProviderAdapter).
//!
//! # Example
//!
//! ```no_run
//! use cloud_driver::{AwsAdapter, EksClient};
//! use cluster_model::Iid;
//! use provisioner::{Orchestrator, ProvisionConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EksClient::new(None, "token".to_string(), "us-east-1".to_string())?;
//! let orchestrator = Orchestrator::new(Arc::new(AwsAdapter::new(client)), ProvisionConfig::default());
//!
//! let cluster = orchestrator.get_cluster(&Iid::from_name("demo")).await?;
//! println!("{} has {} node groups", cluster.iid, cluster.node_groups.len());
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod config;
pub mod orchestrator;
pub mod poller;

#[cfg(test)]
mod orchestrator_test;
#[cfg(test)]
mod test_utils;

pub use backoff::FibonacciBackoff;
pub use config::{BackoffStrategy, PollConfig, ProvisionConfig};
pub use orchestrator::{ClusterCreation, NodeGroupFailure, Orchestrator};
pub use poller::{PollOutcome, StatePoller};
