//! Identifier pairs
//!
//! Every resource is referenced by an [`Iid`]: the caller-chosen name and the
//! identifier the provider assigned at creation time.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier pair `(name_id, system_id)`
///
/// `name_id` is chosen by the caller and stays stable across calls.
/// `system_id` is assigned by the provider and is the only reliable lookup key
/// once the resource exists; it never changes for the resource's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Iid {
    /// User-facing name
    #[serde(default)]
    pub name_id: String,

    /// Provider-assigned identifier
    #[serde(default)]
    pub system_id: String,
}

impl Iid {
    /// Create an identifier pair
    pub fn new(name_id: impl Into<String>, system_id: impl Into<String>) -> Self {
        Self {
            name_id: name_id.into(),
            system_id: system_id.into(),
        }
    }

    /// Reference a resource known only by its name (not yet created)
    pub fn from_name(name_id: impl Into<String>) -> Self {
        Self::new(name_id, String::new())
    }

    /// Reference a provider resource with no user label; `name_id` mirrors `system_id`
    pub fn from_system_id(system_id: impl Into<String>) -> Self {
        let system_id = system_id.into();
        Self::new(system_id.clone(), system_id)
    }

    /// Whether the provider has assigned an identifier yet
    pub fn is_assigned(&self) -> bool {
        !self.system_id.is_empty()
    }

    /// Fill an empty `name_id` from `system_id`
    #[must_use]
    pub fn with_default_name(mut self) -> Self {
        if self.name_id.is_empty() {
            self.name_id.clone_from(&self.system_id);
        }
        self
    }
}

impl fmt::Display for Iid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name_id.is_empty(), self.system_id.is_empty()) {
            (false, false) if self.name_id != self.system_id => {
                write!(f, "{} ({})", self.name_id, self.system_id)
            }
            (false, _) => f.write_str(&self.name_id),
            (true, _) => f.write_str(&self.system_id),
        }
    }
}

/// Free-form attribute reported by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
