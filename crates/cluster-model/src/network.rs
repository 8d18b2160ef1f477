//! Network references

use crate::error::ValidationError;
use crate::iid::Iid;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Network placement of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRef {
    /// Virtual network the subnets belong to, when the provider reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<Iid>,

    /// Subnets the control plane and nodes attach to
    #[serde(default)]
    pub subnets: Vec<Iid>,

    /// Security groups applied to the control plane and node remote access
    #[serde(default)]
    pub security_groups: Vec<Iid>,
}

impl NetworkRef {
    /// Cluster creation needs at least one subnet and one security group
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.subnets.is_empty() {
            return Err(ValidationError::MissingField("network.subnets"));
        }
        if self.security_groups.is_empty() {
            return Err(ValidationError::MissingField("network.securityGroups"));
        }
        Ok(())
    }
}
