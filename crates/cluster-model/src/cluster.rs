//! Cluster request and read model

use crate::error::ValidationError;
use crate::iid::{Iid, KeyValue};
use crate::network::NetworkRef;
use crate::node_group::{NodeGroupInfo, NodeGroupSpec};
use crate::status::ResourceStatus;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Cluster creation request, immutable once submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    pub name_id: String,

    /// Target Kubernetes version; provider default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    pub network: NetworkRef,

    /// Node-groups created after the cluster, in order
    #[serde(default)]
    pub node_groups: Vec<NodeGroupSpec>,
}

impl ClusterSpec {
    /// Validate everything checkable without a provider call
    ///
    /// Node-group bounds are checked here too so an invalid request never
    /// reaches the provider half-created.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name_id.trim().is_empty() {
            return Err(ValidationError::MissingField("nameId"));
        }
        self.network.validate()?;
        for node_group in &self.node_groups {
            node_group.validate().map_err(|e| ValidationError::NodeGroup {
                name: node_group.iid.name_id.clone(),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}

/// Cluster snapshot rebuilt from live provider state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    pub iid: Iid,

    pub status: ResourceStatus,

    #[serde(default)]
    pub version: String,

    pub network: NetworkRef,

    /// Node-groups whose parent reference matches this cluster
    #[serde(default)]
    pub node_groups: Vec<NodeGroupInfo>,

    /// Node-groups listed under this cluster whose parent reference does not resolve to it
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orphaned_node_groups: Vec<NodeGroupInfo>,

    /// API server endpoint once provisioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_values: Vec<KeyValue>,
}
