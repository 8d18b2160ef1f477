//! Canonical Cluster Model
//!
//! Provider-agnostic data structures exchanged between callers and the
//! provisioning orchestrator. Every provider adapter translates its native
//! request/response shapes to and from these types.
//!
//! # Example
//!
//! ```
//! use cluster_model::{ClusterSpec, Iid, NetworkRef, NodeGroupSpec};
//!
//! let spec = ClusterSpec {
//!     name_id: "demo".to_string(),
//!     version: Some("1.29".to_string()),
//!     network: NetworkRef {
//!         vpc: None,
//!         subnets: vec![Iid::from_system_id("subnet-0a1b")],
//!         security_groups: vec![Iid::from_system_id("sg-0c2d")],
//!     },
//!     node_groups: vec![NodeGroupSpec::new("workers", 2, 1, 3)],
//! };
//! assert!(spec.validate().is_ok());
//! ```

pub mod cluster;
pub mod error;
pub mod iid;
pub mod network;
pub mod node_group;
pub mod status;

pub use cluster::*;
pub use error::ValidationError;
pub use iid::*;
pub use network::*;
pub use node_group::*;
pub use status::*;
