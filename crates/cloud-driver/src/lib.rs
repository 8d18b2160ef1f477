//! Cloud Provider Driver
//!
//! Provider-facing half of the cluster provisioner: the [`ProviderAdapter`]
//! trait the orchestrator programs against, the canonical [`CloudError`]
//! taxonomy with its per-platform error normalization, and the AWS EKS
//! adapter.
//!
//! # Example
//!
//! ```no_run
//! use cloud_driver::{AwsAdapter, EksClient, ProviderAdapter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EksClient::new(None, "token".to_string(), "us-east-1".to_string())?;
//! let adapter = AwsAdapter::new(client);
//!
//! for cluster in adapter.list_clusters().await? {
//!     let info = adapter.get_cluster(&cluster).await?;
//!     println!("{} is {}", info.iid, info.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **test-util**: in-memory EKS simulator ([`MockEks`]) for driving the
//!   adapter and orchestrator without a live endpoint

pub mod aws;
pub mod common;
pub mod error;
pub mod normalize;
#[path = "trait.rs"]
pub mod adapter_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use adapter_trait::{ProviderAdapter, RolePurpose, RoleRef};
pub use aws::{AwsAdapter, EksApi, EksClient, RoleConvention};
pub use common::HttpClient;
pub use error::{CloudError, ErrorKind};
pub use normalize::{ErrorDialect, NativeError};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockEks;
