//! Provisioning Orchestrator
//!
//! Sequences provider calls for cluster and node-group lifecycle requests.
//! The orchestrator holds no mutable state: one adapter and immutable
//! configuration, so independent requests can run concurrently on clones.
//! Every snapshot it returns is rebuilt from live provider state.

use crate::config::ProvisionConfig;
use crate::poller::{PollOutcome, StatePoller};
use cloud_driver::{CloudError, ProviderAdapter, RolePurpose, RoleRef};
use cluster_model::{ClusterInfo, ClusterSpec, Iid, NodeGroupInfo, NodeGroupSpec, ResourceStatus, ScalingBounds};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A node-group that could not be provisioned during cluster creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupFailure {
    /// `name_id` from the requested node-group spec
    pub name_id: String,
    /// Why the node-group was not provisioned, serialized as its message
    #[serde(serialize_with = "serialize_display")]
    pub error: CloudError,
}

/// Result of a cluster creation
///
/// Node-group failures do not fail the cluster; they are reported here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCreation {
    pub cluster: ClusterInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_node_groups: Vec<NodeGroupFailure>,
}

fn serialize_display<S: serde::Serializer>(value: &CloudError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Drives cluster and node-group lifecycles through one provider adapter
///
/// Cheap to clone; clones share the adapter.
#[derive(Clone)]
pub struct Orchestrator {
    adapter: Arc<dyn ProviderAdapter>,
    config: ProvisionConfig,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("platform", &self.adapter.platform())
            .field("config", &self.config)
            .finish()
    }
}

impl Orchestrator {
    pub fn new(adapter: Arc<dyn ProviderAdapter>, config: ProvisionConfig) -> Self {
        Self { adapter, config }
    }

    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    /// Create a cluster and its node-groups
    ///
    /// Everything is validated before the first provider call, and both
    /// execution roles are resolved before anything is submitted. Node-groups
    /// are added one at a time, in order; a failed node-group is recorded and
    /// the remaining ones are still submitted. Nothing is rolled back.
    pub async fn create_cluster(&self, spec: &ClusterSpec) -> Result<ClusterCreation, CloudError> {
        spec.validate()?;
        self.adapter.check_cluster_spec(spec)?;

        let cluster_role = self.adapter.resolve_role(RolePurpose::Cluster).await?;
        let node_group_role = if spec.node_groups.is_empty() {
            None
        } else {
            Some(self.adapter.resolve_role(RolePurpose::NodeGroup).await?)
        };

        info!(cluster = %spec.name_id, platform = self.adapter.platform(), node_groups = spec.node_groups.len(), "Creating cluster");
        let iid = self.adapter.create_cluster(spec, &cluster_role).await?;

        if self.config.wait_for_cluster {
            self.wait_for_cluster_active(&iid).await.inspect_err(|e| {
                error!(cluster = %iid, error = %e, "Cluster did not become active");
            })?;
        }

        let mut failed_node_groups = Vec::new();
        if let Some(role) = node_group_role {
            for node_group in &spec.node_groups {
                match self.submit_node_group(&iid, node_group, &role).await {
                    Ok(info) => {
                        info!(cluster = %iid, node_group = %info.iid, status = %info.status, "Node group provisioned");
                    }
                    Err(e) => {
                        warn!(cluster = %iid, node_group = %node_group.iid.name_id, error = %e, "Node group failed; continuing with the rest");
                        failed_node_groups.push(NodeGroupFailure {
                            name_id: node_group.iid.name_id.clone(),
                            error: e,
                        });
                    }
                }
            }
        }

        let cluster = self.get_cluster(&iid).await?;
        info!(cluster = %cluster.iid, status = %cluster.status, failed = failed_node_groups.len(), "Cluster creation finished");
        Ok(ClusterCreation {
            cluster,
            failed_node_groups,
        })
    }

    /// Full cluster snapshot including its node-groups
    ///
    /// Node-groups that fail to describe are skipped; node-groups whose parent
    /// reference does not resolve to this cluster are reported as orphaned.
    pub async fn get_cluster(&self, cluster: &Iid) -> Result<ClusterInfo, CloudError> {
        let mut info = self.adapter.get_cluster(cluster).await?;
        let (node_groups, orphaned) = self.describe_node_groups(&info.iid).await?;
        info.node_groups = node_groups;
        info.orphaned_node_groups = orphaned;
        Ok(info)
    }

    /// Every cluster that can still be described
    pub async fn list_clusters(&self) -> Result<Vec<ClusterInfo>, CloudError> {
        let ids = self.adapter.list_clusters().await?;
        let mut clusters = Vec::with_capacity(ids.len());
        for iid in ids {
            match self.get_cluster(&iid).await {
                Ok(info) => clusters.push(info),
                Err(e) => warn!(cluster = %iid, error = %e, "Skipping cluster that could not be described"),
            }
        }
        Ok(clusters)
    }

    /// Delete a cluster and wait until the provider confirms it is gone
    ///
    /// Returns `true` only once deletion is confirmed; a rejected deletion is an error.
    pub async fn delete_cluster(&self, cluster: &Iid) -> Result<bool, CloudError> {
        info!(cluster = %cluster, "Deleting cluster");
        self.adapter.delete_cluster(cluster).await?;

        let resource = format!("cluster {cluster}");
        let outcome = StatePoller::new(self.config.delete)
            .wait_for(
                &resource,
                || self.adapter.get_cluster(cluster),
                |info: &ClusterInfo| matches!(info.status, ResourceStatus::Deleted | ResourceStatus::Error),
            )
            .await?;

        confirm_deleted(&resource, outcome.map(|info| info.status))
    }

    /// Submit a version change and return the current snapshot without waiting
    pub async fn upgrade_cluster(&self, cluster: &Iid, version: &str) -> Result<ClusterInfo, CloudError> {
        if version.trim().is_empty() {
            return Err(CloudError::InvalidRequest("target version must not be empty".to_string()));
        }
        info!(cluster = %cluster, version, "Upgrading cluster");
        self.adapter.upgrade_cluster(cluster, version).await?;
        self.get_cluster(cluster).await
    }

    /// Add one node-group to an existing cluster
    pub async fn add_node_group(&self, cluster: &Iid, spec: &NodeGroupSpec) -> Result<NodeGroupInfo, CloudError> {
        spec.validate()?;
        self.adapter.check_node_group_spec(spec)?;
        let role = self.adapter.resolve_role(RolePurpose::NodeGroup).await?;
        self.submit_node_group(cluster, spec, &role).await
    }

    pub async fn get_node_group(&self, cluster: &Iid, node_group: &Iid) -> Result<NodeGroupInfo, CloudError> {
        self.adapter.get_node_group(cluster, node_group).await
    }

    /// Node-groups of a cluster that can still be described
    ///
    /// Node-groups whose parent reference names another cluster are left out
    /// and logged; [`get_cluster`](Self::get_cluster) returns them in
    /// `orphaned_node_groups`.
    pub async fn list_node_groups(&self, cluster: &Iid) -> Result<Vec<NodeGroupInfo>, CloudError> {
        let info = self.adapter.get_cluster(cluster).await?;
        let (node_groups, _) = self.describe_node_groups(&info.iid).await?;
        Ok(node_groups)
    }

    /// Remove a node-group and wait until the provider confirms it is gone
    pub async fn remove_node_group(&self, cluster: &Iid, node_group: &Iid) -> Result<bool, CloudError> {
        info!(cluster = %cluster, node_group = %node_group, "Removing node group");
        self.adapter.remove_node_group(cluster, node_group).await?;

        let resource = format!("node group {node_group}");
        let outcome = StatePoller::new(self.config.delete)
            .wait_for(
                &resource,
                || self.adapter.get_node_group(cluster, node_group),
                |info: &NodeGroupInfo| matches!(info.status, ResourceStatus::Deleted | ResourceStatus::Error),
            )
            .await?;

        confirm_deleted(&resource, outcome.map(|info| info.status))
    }

    /// Apply new scaling bounds to every scaling group backing a node-group
    pub async fn change_node_group_scaling(
        &self,
        cluster: &Iid,
        node_group: &Iid,
        bounds: ScalingBounds,
    ) -> Result<NodeGroupInfo, CloudError> {
        bounds.validate()?;

        let current = self.adapter.get_node_group(cluster, node_group).await?;
        if current.scaling_group_ids.is_empty() {
            return Err(CloudError::ResourceNotFound(format!(
                "node group {node_group} has no scaling group yet"
            )));
        }

        info!(
            cluster = %cluster,
            node_group = %node_group,
            desired = bounds.desired,
            min = bounds.min,
            max = bounds.max,
            scaling_groups = current.scaling_group_ids.len(),
            "Changing node group scaling"
        );
        for scaling_group in &current.scaling_group_ids {
            self.adapter.scale_node_group(scaling_group, &bounds).await?;
        }

        self.adapter.get_node_group(cluster, node_group).await
    }

    async fn wait_for_cluster_active(&self, cluster: &Iid) -> Result<ClusterInfo, CloudError> {
        let resource = format!("cluster {cluster}");
        let outcome = StatePoller::new(self.config.create)
            .wait_for(
                &resource,
                || self.adapter.get_cluster(cluster),
                |info: &ClusterInfo| info.status.is_terminal(),
            )
            .await?;
        settled_active(&resource, outcome.map(|info| (info.status, info)))
    }

    /// Submit one node-group against the cluster's live network and read it back
    async fn submit_node_group(
        &self,
        cluster: &Iid,
        spec: &NodeGroupSpec,
        role: &RoleRef,
    ) -> Result<NodeGroupInfo, CloudError> {
        let network = self.adapter.get_cluster(cluster).await?.network;
        let iid = self.adapter.add_node_group(cluster, &network, spec, role).await?;

        if !self.config.wait_for_node_groups {
            return self.adapter.get_node_group(cluster, &iid).await;
        }

        let resource = format!("node group {iid}");
        let outcome = StatePoller::new(self.config.create)
            .wait_for(
                &resource,
                || self.adapter.get_node_group(cluster, &iid),
                |info: &NodeGroupInfo| info.status.is_terminal(),
            )
            .await?;
        settled_active(&resource, outcome.map(|info| (info.status, info)))
    }

    async fn describe_node_groups(
        &self,
        cluster: &Iid,
    ) -> Result<(Vec<NodeGroupInfo>, Vec<NodeGroupInfo>), CloudError> {
        let mut node_groups = Vec::new();
        let mut orphaned = Vec::new();

        for iid in self.adapter.list_node_groups(cluster).await? {
            match self.adapter.get_node_group(cluster, &iid).await {
                Ok(info) if info.belongs_to(cluster) => node_groups.push(info),
                Ok(info) => {
                    warn!(cluster = %cluster, node_group = %info.iid, parent = %info.cluster, "Node group refers to another cluster");
                    orphaned.push(info);
                }
                Err(e) => warn!(cluster = %cluster, node_group = %iid, error = %e, "Skipping node group that could not be described"),
            }
        }
        Ok((node_groups, orphaned))
    }
}

fn settled_active<T>(resource: &str, outcome: PollOutcome<(ResourceStatus, T)>) -> Result<T, CloudError> {
    match outcome {
        PollOutcome::Reached((ResourceStatus::Active, value)) => Ok(value),
        PollOutcome::Reached((status, _)) => Err(CloudError::failed_state(resource, status)),
        PollOutcome::Gone => Err(CloudError::ResourceNotFound(format!("{resource} disappeared while provisioning"))),
    }
}

fn confirm_deleted(resource: &str, outcome: PollOutcome<ResourceStatus>) -> Result<bool, CloudError> {
    match outcome {
        PollOutcome::Gone | PollOutcome::Reached(ResourceStatus::Deleted) => {
            info!(resource, "Deletion confirmed");
            Ok(true)
        }
        PollOutcome::Reached(status) => {
            error!(resource, %status, "Deletion failed");
            Err(CloudError::failed_state(resource, status))
        }
    }
}
