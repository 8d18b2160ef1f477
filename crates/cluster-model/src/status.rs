//! Resource lifecycle status

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status shared by clusters and node-groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ResourceStatus {
    Creating,
    Active,
    Updating,
    Deleting,
    Deleted,
    Error,
}

impl ResourceStatus {
    /// A terminal status does not change without a new request
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Active | Self::Deleted | Self::Error)
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Creating => "Creating",
            Self::Active => "Active",
            Self::Updating => "Updating",
            Self::Deleting => "Deleting",
            Self::Deleted => "Deleted",
            Self::Error => "Error",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(ResourceStatus::Active.is_terminal());
        assert!(ResourceStatus::Deleted.is_terminal());
        assert!(ResourceStatus::Error.is_terminal());
        assert!(!ResourceStatus::Creating.is_terminal());
        assert!(!ResourceStatus::Updating.is_terminal());
        assert!(!ResourceStatus::Deleting.is_terminal());
    }
}
