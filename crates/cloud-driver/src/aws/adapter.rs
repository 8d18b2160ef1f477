//! AWS EKS provider adapter
//!
//! Translates canonical requests into EKS calls and rebuilds canonical
//! snapshots from native describes. EKS addresses clusters and node groups by
//! name, so the native name doubles as the `system_id`; the caller's
//! `name_id` travels in a tag and is recovered from it on read-back.

use super::api::EksApi;
use super::models::*;
use crate::adapter_trait::{ProviderAdapter, RolePurpose, RoleRef};
use crate::error::CloudError;
use chrono::{DateTime, Utc};
use cluster_model::{
    ClusterInfo, ClusterSpec, Iid, KeyValue, NetworkRef, NodeGroupInfo, NodeGroupSpec, ResourceStatus,
    ScalingBounds,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Tag carrying a cluster's `name_id`
pub const CLUSTER_NAME_TAG: &str = "cluster";
/// Tag carrying a node group's `name_id`
pub const NODEGROUP_NAME_TAG: &str = "nodegroup";

/// Longest EKS cluster name
pub const CLUSTER_NAME_MAX: usize = 100;
/// Longest EKS node-group name
pub const NODEGROUP_NAME_MAX: usize = 63;

/// IAM role names looked up for each purpose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleConvention {
    pub cluster_role: String,
    pub node_group_role: String,
}

impl Default for RoleConvention {
    fn default() -> Self {
        Self {
            cluster_role: "cloud-barista-spider-eks-cluster-role".to_string(),
            node_group_role: "cloud-barista-spider-eks-nodegroup-role".to_string(),
        }
    }
}

impl RoleConvention {
    pub fn role_name(&self, purpose: RolePurpose) -> &str {
        match purpose {
            RolePurpose::Cluster => &self.cluster_role,
            RolePurpose::NodeGroup => &self.node_group_role,
        }
    }
}

/// EKS implementation of [`ProviderAdapter`]
#[derive(Debug, Clone)]
pub struct AwsAdapter<A> {
    api: A,
    roles: RoleConvention,
}

impl<A: EksApi> AwsAdapter<A> {
    pub fn new(api: A) -> Self {
        Self::with_roles(api, RoleConvention::default())
    }

    pub fn with_roles(api: A, roles: RoleConvention) -> Self {
        Self { api, roles }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    async fn collect_cluster_names(&self) -> Result<Vec<String>, CloudError> {
        let mut names = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = self.api.list_clusters(next_token.as_deref()).await?;
            names.extend(page.clusters);
            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        Ok(names)
    }

    async fn collect_nodegroup_names(&self, cluster: &str) -> Result<Vec<String>, CloudError> {
        let mut names = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = self.api.list_nodegroups(cluster, next_token.as_deref()).await?;
            names.extend(page.nodegroups);
            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        Ok(names)
    }
}

#[async_trait::async_trait]
impl<A: EksApi> ProviderAdapter for AwsAdapter<A> {
    fn platform(&self) -> &str {
        "aws"
    }

    fn check_cluster_spec(&self, spec: &ClusterSpec) -> Result<(), CloudError> {
        required_name(&spec.name_id, CLUSTER_NAME_MAX)?;
        spec.node_groups.iter().try_for_each(|ng| self.check_node_group_spec(ng))
    }

    fn check_node_group_spec(&self, spec: &NodeGroupSpec) -> Result<(), CloudError> {
        required_name(&spec.iid.name_id, NODEGROUP_NAME_MAX).map(drop)
    }

    async fn resolve_role(&self, purpose: RolePurpose) -> Result<RoleRef, CloudError> {
        let name = self.roles.role_name(purpose);
        let role = self.api.get_role(name).await.map_err(|e| {
            if e.is_not_found() {
                CloudError::RoleNotFound(format!("IAM role {name} does not exist"))
            } else {
                e
            }
        })?;
        debug!(role = %role.role_name, arn = %role.arn, ?purpose, "Resolved IAM role");
        Ok(RoleRef {
            name: role.role_name,
            id: role.arn,
        })
    }

    async fn create_cluster(&self, spec: &ClusterSpec, role: &RoleRef) -> Result<Iid, CloudError> {
        let name = required_name(&spec.name_id, CLUSTER_NAME_MAX)?;
        let request = CreateClusterRequest {
            name: name.clone(),
            version: spec.version.clone(),
            role_arn: role.id.clone(),
            resources_vpc_config: VpcConfigRequest {
                subnet_ids: system_ids(&spec.network.subnets, "subnet")?,
                security_group_ids: system_ids(&spec.network.security_groups, "security group")?,
            },
            tags: Tags::from([(CLUSTER_NAME_TAG.to_string(), spec.name_id.clone())]),
        };

        info!(cluster = %spec.name_id, native_name = %name, "Submitting EKS CreateCluster");
        let cluster = self.api.create_cluster(&request).await?;
        Ok(Iid::new(spec.name_id.clone(), cluster.name))
    }

    async fn get_cluster(&self, cluster: &Iid) -> Result<ClusterInfo, CloudError> {
        let name = native_name(cluster, CLUSTER_NAME_MAX)?;
        let native = self.api.describe_cluster(&name).await?;
        Ok(cluster_info(native))
    }

    async fn list_clusters(&self) -> Result<Vec<Iid>, CloudError> {
        let names = self.collect_cluster_names().await?;
        Ok(names.into_iter().map(Iid::from_system_id).collect())
    }

    async fn delete_cluster(&self, cluster: &Iid) -> Result<(), CloudError> {
        let name = native_name(cluster, CLUSTER_NAME_MAX)?;
        info!(cluster = %cluster, "Submitting EKS DeleteCluster");
        self.api.delete_cluster(&name).await?;
        Ok(())
    }

    async fn upgrade_cluster(&self, cluster: &Iid, version: &str) -> Result<(), CloudError> {
        let name = native_name(cluster, CLUSTER_NAME_MAX)?;
        let update = self.api.update_cluster_version(&name, version).await?;
        info!(cluster = %cluster, version, update_id = %update.id, "Submitted EKS UpdateClusterVersion");
        Ok(())
    }

    async fn add_node_group(
        &self,
        cluster: &Iid,
        network: &NetworkRef,
        spec: &NodeGroupSpec,
        role: &RoleRef,
    ) -> Result<Iid, CloudError> {
        let cluster_name = native_name(cluster, CLUSTER_NAME_MAX)?;
        let name = required_name(&spec.iid.name_id, NODEGROUP_NAME_MAX)?;
        let bounds = spec.bounds();

        let remote_access = match &spec.key_pair {
            Some(key_pair) => Some(RemoteAccessConfig {
                ec2_ssh_key: Some(lookup_key(key_pair).to_string()),
                source_security_groups: system_ids(&network.security_groups, "security group")?,
            }),
            None => None,
        };

        let request = CreateNodegroupRequest {
            nodegroup_name: name.clone(),
            scaling_config: scaling_config(&bounds),
            disk_size: spec.root_disk_size_gb.map(i64::from),
            instance_types: spec.vm_spec.clone().map(|vm_spec| vec![vm_spec]),
            subnets: system_ids(&network.subnets, "subnet")?,
            node_role: role.id.clone(),
            remote_access,
            tags: Tags::from([(NODEGROUP_NAME_TAG.to_string(), spec.iid.name_id.clone())]),
        };

        info!(cluster = %cluster, node_group = %spec.iid.name_id, native_name = %name, "Submitting EKS CreateNodegroup");
        let nodegroup = self.api.create_nodegroup(&cluster_name, &request).await?;
        Ok(Iid::new(spec.iid.name_id.clone(), nodegroup.nodegroup_name))
    }

    async fn get_node_group(&self, cluster: &Iid, node_group: &Iid) -> Result<NodeGroupInfo, CloudError> {
        let cluster_name = native_name(cluster, CLUSTER_NAME_MAX)?;
        let name = native_name(node_group, NODEGROUP_NAME_MAX)?;
        let native = self.api.describe_nodegroup(&cluster_name, &name).await?;
        Ok(node_group_info(native))
    }

    async fn list_node_groups(&self, cluster: &Iid) -> Result<Vec<Iid>, CloudError> {
        let cluster_name = native_name(cluster, CLUSTER_NAME_MAX)?;
        let names = self.collect_nodegroup_names(&cluster_name).await?;
        Ok(names.into_iter().map(Iid::from_system_id).collect())
    }

    async fn remove_node_group(&self, cluster: &Iid, node_group: &Iid) -> Result<(), CloudError> {
        let cluster_name = native_name(cluster, CLUSTER_NAME_MAX)?;
        let name = native_name(node_group, NODEGROUP_NAME_MAX)?;
        info!(cluster = %cluster, node_group = %node_group, "Submitting EKS DeleteNodegroup");
        self.api.delete_nodegroup(&cluster_name, &name).await?;
        Ok(())
    }

    async fn scale_node_group(&self, scaling_group_id: &str, bounds: &ScalingBounds) -> Result<(), CloudError> {
        let request = UpdateAutoScalingGroupRequest {
            auto_scaling_group_name: scaling_group_id.to_string(),
            min_size: i64::from(bounds.min),
            max_size: i64::from(bounds.max),
            desired_capacity: i64::from(bounds.desired),
        };
        debug!(scaling_group = scaling_group_id, ?bounds, "Updating Auto Scaling group");
        self.api.update_auto_scaling_group(&request).await
    }
}

/// Whether `name` is usable verbatim as an EKS resource name
///
/// EKS accepts `[A-Za-z0-9][A-Za-z0-9_-]*` up to `max` characters. Names are
/// never rewritten, so distinct `name_id`s always address distinct resources.
pub fn is_valid_native_name(name: &str, max: usize) -> bool {
    let mut chars = name.chars();
    let starts_alphanumeric = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
    starts_alphanumeric
        && name.len() <= max
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn required_name(name_id: &str, max: usize) -> Result<String, CloudError> {
    if !is_valid_native_name(name_id, max) {
        return Err(CloudError::InvalidRequest(format!(
            "name {name_id:?} is not a valid EKS resource name (expected [A-Za-z0-9][A-Za-z0-9_-]*, at most {max} characters)"
        )));
    }
    Ok(name_id.to_string())
}

/// Native lookup key: the assigned identifier, else the `name_id` itself
fn native_name(iid: &Iid, max: usize) -> Result<String, CloudError> {
    if iid.is_assigned() {
        Ok(iid.system_id.clone())
    } else {
        required_name(&iid.name_id, max)
    }
}

fn lookup_key(iid: &Iid) -> &str {
    if iid.is_assigned() { &iid.system_id } else { &iid.name_id }
}

fn system_ids(iids: &[Iid], what: &str) -> Result<Vec<String>, CloudError> {
    iids.iter()
        .map(|iid| {
            if iid.is_assigned() {
                Ok(iid.system_id.clone())
            } else {
                Err(CloudError::InvalidRequest(format!("{what} {iid} has no system id")))
            }
        })
        .collect()
}

fn scaling_config(bounds: &ScalingBounds) -> NodegroupScalingConfig {
    NodegroupScalingConfig {
        min_size: Some(i64::from(bounds.min)),
        max_size: Some(i64::from(bounds.max)),
        desired_size: Some(i64::from(bounds.desired)),
    }
}

/// EKS cluster or node-group status to canonical status
pub fn map_status(status: Option<&str>) -> ResourceStatus {
    match status {
        Some("CREATING" | "PENDING") => ResourceStatus::Creating,
        Some("ACTIVE" | "DEGRADED") => ResourceStatus::Active,
        Some("UPDATING") => ResourceStatus::Updating,
        Some("DELETING") => ResourceStatus::Deleting,
        _ => ResourceStatus::Error,
    }
}

/// Recover a resource's IID; `name_id` falls back to the native name when the tag is absent
fn tagged_iid(tags: Option<&Tags>, key: &str, native_name: String) -> Iid {
    let name_id = tags
        .and_then(|tags| tags.get(key))
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_default();
    Iid::new(name_id, native_name).with_default_name()
}

fn epoch_to_utc(seconds: f64) -> Option<DateTime<Utc>> {
    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * 1e9).round();
    DateTime::from_timestamp(whole as i64, nanos.clamp(0.0, 999_999_999.0) as u32)
}

fn to_u32(value: Option<i64>) -> u32 {
    value.and_then(|v| u32::try_from(v).ok()).unwrap_or_default()
}

fn push_key_value(key_values: &mut Vec<KeyValue>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        key_values.push(KeyValue::new(key, value));
    }
}

/// Canonical cluster snapshot from a native describe; `node_groups` is left empty
pub fn cluster_info(cluster: Cluster) -> ClusterInfo {
    let vpc = cluster.resources_vpc_config.unwrap_or_default();
    let network = NetworkRef {
        vpc: vpc.vpc_id.map(Iid::from_system_id),
        subnets: vpc.subnet_ids.into_iter().map(Iid::from_system_id).collect(),
        security_groups: vpc.security_group_ids.into_iter().map(Iid::from_system_id).collect(),
    };

    let mut key_values = Vec::new();
    push_key_value(&mut key_values, "Arn", cluster.arn);
    push_key_value(&mut key_values, "RoleArn", cluster.role_arn);
    push_key_value(&mut key_values, "PlatformVersion", cluster.platform_version);
    push_key_value(&mut key_values, "ClusterSecurityGroupId", vpc.cluster_security_group_id);

    ClusterInfo {
        iid: tagged_iid(cluster.tags.as_ref(), CLUSTER_NAME_TAG, cluster.name),
        status: map_status(cluster.status.as_deref()),
        version: cluster.version.unwrap_or_default(),
        network,
        node_groups: Vec::new(),
        orphaned_node_groups: Vec::new(),
        endpoint: cluster.endpoint.filter(|e| !e.is_empty()),
        created_at: cluster.created_at.and_then(epoch_to_utc),
        key_values,
    }
}

/// Canonical node-group snapshot from a native describe
pub fn node_group_info(nodegroup: Nodegroup) -> NodeGroupInfo {
    let scaling = nodegroup.scaling_config.unwrap_or_default();

    // Instances named in health issues are the only member nodes EKS reports
    let mut nodes: Vec<Iid> = Vec::new();
    for issue in nodegroup.health.map(|h| h.issues).unwrap_or_default() {
        for id in issue.resource_ids {
            let node = Iid::from_system_id(id);
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }
    }

    let scaling_group_ids = nodegroup
        .resources
        .map(|r| r.auto_scaling_groups.into_iter().map(|asg| asg.name).collect())
        .unwrap_or_default();

    let mut key_values = Vec::new();
    push_key_value(&mut key_values, "Arn", nodegroup.nodegroup_arn);
    push_key_value(&mut key_values, "NodeRole", nodegroup.node_role);
    push_key_value(&mut key_values, "AmiType", nodegroup.ami_type);
    push_key_value(&mut key_values, "CapacityType", nodegroup.capacity_type);
    push_key_value(&mut key_values, "ReleaseVersion", nodegroup.release_version);

    NodeGroupInfo {
        iid: tagged_iid(nodegroup.tags.as_ref(), NODEGROUP_NAME_TAG, nodegroup.nodegroup_name),
        cluster: Iid::from_system_id(nodegroup.cluster_name),
        status: map_status(nodegroup.status.as_deref()),
        vm_spec: nodegroup.instance_types.and_then(|types| types.into_iter().next()),
        root_disk_size_gb: nodegroup.disk_size.and_then(|size| u32::try_from(size).ok()),
        desired_node_size: to_u32(scaling.desired_size),
        min_node_size: to_u32(scaling.min_size),
        max_node_size: to_u32(scaling.max_size),
        key_pair: nodegroup
            .remote_access
            .and_then(|access| access.ec2_ssh_key)
            .map(Iid::from_system_id),
        nodes,
        scaling_group_ids,
        key_values,
    }
}
