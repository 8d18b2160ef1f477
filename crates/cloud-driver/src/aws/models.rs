//! EKS, IAM and Auto Scaling native models
//!
//! These models match the JSON shapes of the EKS REST API
//! (`/clusters`, `/clusters/{name}/node-groups`) and of the IAM / Auto Scaling
//! calls the adapter needs, as exposed by the configured endpoint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Tags = BTreeMap<String, String>;

/// EKS cluster (DescribeCluster `cluster` member)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// Epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources_vpc_config: Option<VpcConfigResponse>,
    /// CREATING | ACTIVE | DELETING | FAILED | UPDATING | PENDING
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcConfigResponse {
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    #[serde(default)]
    pub security_group_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_security_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcConfigRequest {
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
}

/// Request body for CreateCluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub role_arn: String,
    pub resources_vpc_config: VpcConfigRequest,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterResponse {
    pub cluster: Cluster,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClustersResponse {
    #[serde(default)]
    pub clusters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodegroupScalingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAccessConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec2_ssh_key: Option<String>,
    #[serde(default)]
    pub source_security_groups: Vec<String>,
}

/// Health issue; `resource_ids` are the affected instances
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub resource_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodegroupHealth {
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScalingGroup {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodegroupResources {
    #[serde(default)]
    pub auto_scaling_groups: Vec<AutoScalingGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_access_security_group: Option<String>,
}

/// EKS managed node group (DescribeNodegroup `nodegroup` member)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nodegroup {
    pub nodegroup_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodegroup_arn: Option<String>,
    pub cluster_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_version: Option<String>,
    /// Epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<f64>,
    /// CREATING | ACTIVE | UPDATING | DELETING | CREATE_FAILED | DELETE_FAILED | DEGRADED
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling_config: Option<NodegroupScalingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_types: Option<Vec<String>>,
    #[serde(default)]
    pub subnets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_access: Option<RemoteAccessConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ami_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<NodegroupResources>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<NodegroupHealth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

/// Request body for CreateNodegroup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodegroupRequest {
    pub nodegroup_name: String,
    pub scaling_config: NodegroupScalingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_types: Option<Vec<String>>,
    pub subnets: Vec<String>,
    pub node_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_access: Option<RemoteAccessConfig>,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodegroupResponse {
    pub nodegroup: Nodegroup,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNodegroupsResponse {
    #[serde(default)]
    pub nodegroups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Request body for UpdateClusterVersion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClusterVersionRequest {
    pub version: String,
}

/// Asynchronous update handle returned by EKS
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub update_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub update: Update,
}

/// IAM role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    pub role_name: String,
    pub arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetRoleResponse {
    pub role: Role,
}

/// Request body for UpdateAutoScalingGroup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateAutoScalingGroupRequest {
    pub auto_scaling_group_name: String,
    pub min_size: i64,
    pub max_size: i64,
    pub desired_capacity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_nodegroup_payload_parses() {
        // Trimmed DescribeNodegroup response of a node group whose instances failed to join
        let payload = serde_json::json!({
            "nodegroup": {
                "amiType": "AL2_x86_64",
                "capacityType": "ON_DEMAND",
                "clusterName": "cb-eks-cluster",
                "createdAt": 1_659_664_309.673,
                "diskSize": 20,
                "health": {"issues": [{
                    "code": "NodeCreationFailure",
                    "message": "Unhealthy nodes in the kubernetes cluster",
                    "resourceIds": ["i-06ee95583f3f7de5c", "i-0a283a92dcce27aa8"]
                }]},
                "instanceTypes": ["t3.medium"],
                "labels": {},
                "nodeRole": "arn:aws:iam::012345678910:role/cb-eks-nodegroup-role",
                "nodegroupName": "cb-eks-nodegroup-test",
                "releaseVersion": "1.22.9-20220725",
                "remoteAccess": {"ec2SshKey": "cb-webtool", "sourceSecurityGroups": ["sg-04607666"]},
                "resources": {"autoScalingGroups": [{"name": "eks-cb-eks-nodegroup-test-fec135d9"}]},
                "scalingConfig": {"desiredSize": 2, "maxSize": 2, "minSize": 2},
                "status": "CREATE_FAILED",
                "subnets": ["subnet-262d6d7a", "subnet-d0ee6fab"],
                "tags": {},
                "version": "1.22"
            }
        });

        let response: NodegroupResponse = serde_json::from_value(payload).unwrap();
        let ng = response.nodegroup;
        assert_eq!(ng.nodegroup_name, "cb-eks-nodegroup-test");
        assert_eq!(ng.status.as_deref(), Some("CREATE_FAILED"));
        assert_eq!(ng.health.unwrap().issues[0].resource_ids.len(), 2);
        assert_eq!(ng.resources.unwrap().auto_scaling_groups[0].name, "eks-cb-eks-nodegroup-test-fec135d9");
        assert_eq!(ng.tags, Some(Tags::new()));
    }

    #[test]
    fn test_create_nodegroup_request_omits_unset_fields() {
        let request = CreateNodegroupRequest {
            nodegroup_name: "workers".to_string(),
            scaling_config: NodegroupScalingConfig {
                min_size: Some(1),
                max_size: Some(3),
                desired_size: Some(2),
            },
            disk_size: None,
            instance_types: None,
            subnets: vec!["subnet-1".to_string()],
            node_role: "arn:role".to_string(),
            remote_access: None,
            tags: Tags::new(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("diskSize").is_none());
        assert!(json.get("instanceTypes").is_none());
        assert!(json.get("tags").is_none());
        assert_eq!(json["scalingConfig"]["desiredSize"], 2);
    }
}
