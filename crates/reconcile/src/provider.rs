//! Provider capability set.
//!
//! A provider is the external system holding the actual state: it is the
//! single source of current-state truth, keyed by resource kind + name. The
//! engine holds no cache between runs.

use crate::error::ProviderError;
use std::collections::BTreeMap;

/// A provider's view of a live resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    /// Provider-assigned identifier
    pub id: String,

    /// Full attribute set, generated attributes included
    pub attributes: BTreeMap<String, String>,
}

impl Observed {
    /// Look up a single attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether the observed attributes satisfy a desired set.
    ///
    /// Only keys present in `desired` are compared; provider-generated
    /// attributes never count as drift.
    pub fn satisfies(&self, desired: &BTreeMap<String, String>) -> bool {
        desired
            .iter()
            .all(|(key, value)| self.attribute(key) == Some(value.as_str()))
    }
}

/// CRUD capability set implemented per provider.
///
/// `read` must not mutate provider state; the idempotence guarantee of the
/// engine is defined in terms of the three mutating operations.
pub trait Provider {
    /// Fetch the current state of a resource, or `None` if it does not exist.
    fn read(&self, kind: &str, name: &str) -> Result<Option<Observed>, ProviderError>;

    /// Create a resource with the given desired attributes.
    fn create(
        &mut self,
        kind: &str,
        name: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<Observed, ProviderError>;

    /// Update an existing resource in place.
    ///
    /// Only called for kinds where [`supports_update`](Self::supports_update)
    /// returns true.
    fn update(
        &mut self,
        kind: &str,
        name: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<Observed, ProviderError>;

    /// Destroy a resource.
    fn delete(&mut self, kind: &str, name: &str) -> Result<(), ProviderError>;

    /// Whether `kind` can be updated in place.
    ///
    /// Kinds without in-place update are replaced (delete + create) when
    /// their attributes drift.
    fn supports_update(&self, _kind: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfies_ignores_generated_attributes() {
        let mut attributes = BTreeMap::new();
        attributes.insert("cidr_block".to_string(), "10.0.0.0/16".to_string());
        attributes.insert("arn".to_string(), "arn:aws:ec2:vpc/vpc-1".to_string());
        let observed = Observed {
            id: "vpc-1".to_string(),
            attributes,
        };

        let mut desired = BTreeMap::new();
        desired.insert("cidr_block".to_string(), "10.0.0.0/16".to_string());
        assert!(observed.satisfies(&desired));

        desired.insert("cidr_block".to_string(), "10.1.0.0/16".to_string());
        assert!(!observed.satisfies(&desired));
    }
}
