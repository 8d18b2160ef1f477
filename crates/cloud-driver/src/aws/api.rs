//! EKS native call surface
//!
//! The subset of EKS, IAM and Auto Scaling the adapter needs. [`EksClient`]
//! implements it over HTTP; the in-memory simulator implements it for tests.
//!
//! [`EksClient`]: super::EksClient

use super::models::*;
use crate::error::CloudError;

#[async_trait::async_trait]
pub trait EksApi: Send + Sync {
    // Clusters
    async fn create_cluster(&self, request: &CreateClusterRequest) -> Result<Cluster, CloudError>;
    async fn describe_cluster(&self, name: &str) -> Result<Cluster, CloudError>;
    /// One page of cluster names
    async fn list_clusters(&self, next_token: Option<&str>) -> Result<ListClustersResponse, CloudError>;
    async fn delete_cluster(&self, name: &str) -> Result<Cluster, CloudError>;
    async fn update_cluster_version(&self, name: &str, version: &str) -> Result<Update, CloudError>;

    // Node groups
    async fn create_nodegroup(
        &self,
        cluster: &str,
        request: &CreateNodegroupRequest,
    ) -> Result<Nodegroup, CloudError>;
    async fn describe_nodegroup(&self, cluster: &str, nodegroup: &str) -> Result<Nodegroup, CloudError>;
    /// One page of node-group names
    async fn list_nodegroups(
        &self,
        cluster: &str,
        next_token: Option<&str>,
    ) -> Result<ListNodegroupsResponse, CloudError>;
    async fn delete_nodegroup(&self, cluster: &str, nodegroup: &str) -> Result<Nodegroup, CloudError>;

    // IAM
    async fn get_role(&self, name: &str) -> Result<Role, CloudError>;

    // Auto Scaling
    async fn update_auto_scaling_group(&self, request: &UpdateAutoScalingGroupRequest) -> Result<(), CloudError>;
}
