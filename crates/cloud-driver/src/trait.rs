//! ProviderAdapter trait
//!
//! One implementation per cloud platform, selected at configuration time.
//! The orchestrator depends only on this trait, so tests can drive it with
//! an in-memory provider.

use crate::error::CloudError;
use cluster_model::{ClusterInfo, ClusterSpec, Iid, NetworkRef, NodeGroupInfo, NodeGroupSpec, ScalingBounds};

/// What an execution role is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolePurpose {
    /// Role assumed by the managed control plane
    Cluster,
    /// Role assumed by worker nodes
    NodeGroup,
}

/// Provider-native reference to an execution role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRef {
    /// Role name as looked up through the naming convention
    pub name: String,
    /// Native identifier passed to create calls (ARN, resource id, ...)
    pub id: String,
}

/// Canonical capability set every provider adapter implements
///
/// Mutating calls return once the provider has *accepted* the request;
/// waiting for a settled state is the caller's job.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Platform name used in logs
    fn platform(&self) -> &str;

    /// Reject a cluster request the platform would refuse, before any call
    ///
    /// Covers platform rules the canonical model cannot express, such as
    /// resource naming. The default accepts everything.
    fn check_cluster_spec(&self, _spec: &ClusterSpec) -> Result<(), CloudError> {
        Ok(())
    }

    /// Node-group counterpart of [`check_cluster_spec`](Self::check_cluster_spec)
    fn check_node_group_spec(&self, _spec: &NodeGroupSpec) -> Result<(), CloudError> {
        Ok(())
    }

    /// Resolve the execution role for `purpose`; fails with `RoleNotFound`
    async fn resolve_role(&self, purpose: RolePurpose) -> Result<RoleRef, CloudError>;

    // Cluster Operations
    async fn create_cluster(&self, spec: &ClusterSpec, role: &RoleRef) -> Result<Iid, CloudError>;
    /// Cluster-level snapshot; `node_groups` is left empty
    async fn get_cluster(&self, cluster: &Iid) -> Result<ClusterInfo, CloudError>;
    async fn list_clusters(&self) -> Result<Vec<Iid>, CloudError>;
    async fn delete_cluster(&self, cluster: &Iid) -> Result<(), CloudError>;
    async fn upgrade_cluster(&self, cluster: &Iid, version: &str) -> Result<(), CloudError>;

    // NodeGroup Operations
    async fn add_node_group(
        &self,
        cluster: &Iid,
        network: &NetworkRef,
        spec: &NodeGroupSpec,
        role: &RoleRef,
    ) -> Result<Iid, CloudError>;
    async fn get_node_group(&self, cluster: &Iid, node_group: &Iid) -> Result<NodeGroupInfo, CloudError>;
    async fn list_node_groups(&self, cluster: &Iid) -> Result<Vec<Iid>, CloudError>;
    async fn remove_node_group(&self, cluster: &Iid, node_group: &Iid) -> Result<(), CloudError>;

    /// Apply bounds to one provider scaling group backing a node-group
    async fn scale_node_group(&self, scaling_group_id: &str, bounds: &ScalingBounds) -> Result<(), CloudError>;
}
