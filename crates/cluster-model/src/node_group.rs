//! Node-group request and read model

use crate::error::ValidationError;
use crate::iid::{Iid, KeyValue};
use crate::status::ResourceStatus;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Desired/min/max node counts of a node-group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScalingBounds {
    pub desired: u32,
    pub min: u32,
    pub max: u32,
}

impl ScalingBounds {
    pub fn new(desired: u32, min: u32, max: u32) -> Self {
        Self { desired, min, max }
    }

    /// `max >= 1` and `min <= desired <= max`
    pub fn validate(&self) -> Result<(), ValidationError> {
        let reason = if self.max < 1 {
            "max must be at least 1"
        } else if self.min > self.max {
            "min must not exceed max"
        } else if self.desired < self.min {
            "desired must not be below min"
        } else if self.desired > self.max {
            "desired must not exceed max"
        } else {
            return Ok(());
        };

        Err(ValidationError::InvalidBounds {
            desired: self.desired,
            min: self.min,
            max: self.max,
            reason,
        })
    }
}

/// Node-group creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupSpec {
    /// `name_id` is required; `system_id` is assigned by the provider
    pub iid: Iid,

    /// VM size class (instance type)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_spec: Option<String>,

    /// Root disk size in GB; provider default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_disk_size_gb: Option<u32>,

    pub desired_node_size: u32,
    pub min_node_size: u32,
    pub max_node_size: u32,

    /// SSH key pair used for node remote access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_pair: Option<Iid>,
}

impl NodeGroupSpec {
    /// Minimal spec with a name and scaling bounds
    pub fn new(name_id: impl Into<String>, desired: u32, min: u32, max: u32) -> Self {
        Self {
            iid: Iid::from_name(name_id),
            vm_spec: None,
            root_disk_size_gb: None,
            desired_node_size: desired,
            min_node_size: min,
            max_node_size: max,
            key_pair: None,
        }
    }

    pub fn bounds(&self) -> ScalingBounds {
        ScalingBounds::new(self.desired_node_size, self.min_node_size, self.max_node_size)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.iid.name_id.trim().is_empty() {
            return Err(ValidationError::MissingField("nodeGroup.iid.nameId"));
        }
        self.bounds().validate()
    }
}

/// Node-group snapshot rebuilt from live provider state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupInfo {
    pub iid: Iid,

    /// Cluster this node-group belongs to (association, not ownership)
    pub cluster: Iid,

    pub status: ResourceStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_spec: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_disk_size_gb: Option<u32>,

    pub desired_node_size: u32,
    pub min_node_size: u32,
    pub max_node_size: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_pair: Option<Iid>,

    /// Member nodes reported by the provider
    #[serde(default)]
    pub nodes: Vec<Iid>,

    /// Provider scaling groups backing this node-group
    #[serde(default)]
    pub scaling_group_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_values: Vec<KeyValue>,
}

impl NodeGroupInfo {
    pub fn bounds(&self) -> ScalingBounds {
        ScalingBounds::new(self.desired_node_size, self.min_node_size, self.max_node_size)
    }

    /// Whether this node-group's parent reference matches the given cluster
    pub fn belongs_to(&self, cluster: &Iid) -> bool {
        self.cluster.system_id == cluster.system_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bounds() {
        assert!(ScalingBounds::new(2, 1, 3).validate().is_ok());
        assert!(ScalingBounds::new(0, 0, 1).validate().is_ok());
        assert!(ScalingBounds::new(1, 1, 1).validate().is_ok());
    }

    #[test]
    fn test_desired_below_min_rejected() {
        let err = ScalingBounds::new(1, 2, 3).validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidBounds { reason: "desired must not be below min", .. }));
    }

    #[test]
    fn test_desired_above_max_rejected() {
        assert!(ScalingBounds::new(4, 1, 3).validate().is_err());
    }

    #[test]
    fn test_max_zero_rejected() {
        let err = ScalingBounds::new(0, 0, 0).validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidBounds { reason: "max must be at least 1", .. }));
    }

    #[test]
    fn test_min_above_max_rejected() {
        assert!(ScalingBounds::new(3, 4, 3).validate().is_err());
    }

    #[test]
    fn test_spec_requires_name() {
        let spec = NodeGroupSpec::new("  ", 1, 1, 1);
        assert_eq!(
            spec.validate(),
            Err(ValidationError::MissingField("nodeGroup.iid.nameId"))
        );
    }

    #[test]
    fn test_spec_deserializes_from_camel_case() {
        let spec: NodeGroupSpec = serde_json::from_value(serde_json::json!({
            "iid": {"nameId": "workers"},
            "vmSpec": "t3.medium",
            "rootDiskSizeGb": 40,
            "desiredNodeSize": 2,
            "minNodeSize": 1,
            "maxNodeSize": 4,
            "keyPair": {"nameId": "ops", "systemId": "ops"}
        }))
        .unwrap();
        assert_eq!(spec.iid.name_id, "workers");
        assert!(spec.iid.system_id.is_empty());
        assert_eq!(spec.vm_spec.as_deref(), Some("t3.medium"));
        assert_eq!(spec.bounds(), ScalingBounds::new(2, 1, 4));
    }
}
