//! Desired-state resource declarations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A declared resource: something that should exist, identified by kind + name.
///
/// The attribute map holds the desired configuration. Attributes the provider
/// generates on its own (identifiers, addresses) are never declared here and
/// never count as drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource kind, e.g. "vpc", "subnet", "instance"
    pub kind: String,

    /// Identifying name, unique within the desired set
    pub name: String,

    /// Desired attribute set
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Names of resources that must be reconciled before this one
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl Resource {
    /// Create a resource with no attributes and no dependencies.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            attributes: BTreeMap::new(),
            depends_on: Vec::new(),
        }
    }

    /// Add a desired attribute (builder style).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add a dependency on another resource's name (builder style).
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let r = Resource::new("subnet", "app")
            .with_attribute("cidr_block", "10.0.1.0/24")
            .with_dependency("main");

        assert_eq!(r.kind, "subnet");
        assert_eq!(r.name, "app");
        assert_eq!(r.attributes.get("cidr_block").map(String::as_str), Some("10.0.1.0/24"));
        assert_eq!(r.depends_on, vec!["main".to_string()]);
    }
}
