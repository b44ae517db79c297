//! State-file-backed local provider.
//!
//! A provider simulator complete enough to exercise the full reconcile
//! lifecycle: records live in a TOML file under the user state directory,
//! identifiers are deterministic, and compute kinds get a synthesized
//! public address on create. Every mutation is persisted immediately, so
//! state survives across invocations and `run` can pick up an address
//! provisioned by an earlier `apply`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reconcile::{Observed, Provider, ProviderError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Kinds replaced on drift instead of updated in place.
const REPLACE_ON_CHANGE: &[&str] = &["instance"];

/// Kinds that get a synthesized public address on create.
const ADDRESS_KINDS: &[&str] = &["instance"];

/// A provider record as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Record {
    fn observed(&self) -> Observed {
        Observed {
            id: self.id.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    /// Records keyed by "kind/name"
    #[serde(default)]
    resources: BTreeMap<String, Record>,

    #[serde(default)]
    next_id: u64,

    last_updated: Option<DateTime<Utc>>,
}

/// Provider backed by a local TOML state file.
pub struct LocalProvider {
    path: PathBuf,
    state: StateFile,
}

fn key(kind: &str, name: &str) -> String {
    format!("{kind}/{name}")
}

impl LocalProvider {
    /// Open the provider, loading existing state or starting empty.
    pub fn open(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse state file: {}", path.display()))?
        } else {
            log::debug!("state file {} does not exist, starting empty", path.display());
            StateFile::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            state,
        })
    }

    /// All records currently held, in key order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.state.resources.values()
    }

    /// Find a record by resource name, regardless of kind.
    pub fn find_by_name(&self, name: &str) -> Option<&Record> {
        self.state.resources.values().find(|r| r.name == name)
    }

    fn persist(&mut self) -> std::result::Result<(), ProviderError> {
        self.state.last_updated = Some(Utc::now());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.state)
            .map_err(|e| ProviderError::Other(format!("failed to serialize state: {e}")))?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn assign_id(&mut self, kind: &str) -> String {
        self.state.next_id += 1;
        format!("{kind}-{:04x}", self.state.next_id)
    }
}

impl Provider for LocalProvider {
    fn read(&self, kind: &str, name: &str) -> std::result::Result<Option<Observed>, ProviderError> {
        Ok(self.state.resources.get(&key(kind, name)).map(Record::observed))
    }

    fn create(
        &mut self,
        kind: &str,
        name: &str,
        attributes: &BTreeMap<String, String>,
    ) -> std::result::Result<Observed, ProviderError> {
        if self.state.resources.contains_key(&key(kind, name)) {
            return Err(ProviderError::Rejected(format!(
                "{kind} '{name}' already exists"
            )));
        }

        let id = self.assign_id(kind);
        let mut attributes = attributes.clone();
        if ADDRESS_KINDS.contains(&kind) {
            // Deterministic fake address derived from the id counter
            attributes.insert(
                "public_ip".to_string(),
                format!("10.0.2.{}", 3 + self.state.next_id % 250),
            );
        }

        let record = Record {
            id,
            kind: kind.to_string(),
            name: name.to_string(),
            attributes,
            created_at: Utc::now(),
        };
        let observed = record.observed();
        self.state.resources.insert(key(kind, name), record);
        self.persist()?;
        Ok(observed)
    }

    fn update(
        &mut self,
        kind: &str,
        name: &str,
        attributes: &BTreeMap<String, String>,
    ) -> std::result::Result<Observed, ProviderError> {
        let record = self
            .state
            .resources
            .get_mut(&key(kind, name))
            .ok_or_else(|| ProviderError::Rejected(format!("{kind} '{name}' does not exist")))?;
        for (k, v) in attributes {
            record.attributes.insert(k.clone(), v.clone());
        }
        let observed = record.observed();
        self.persist()?;
        Ok(observed)
    }

    fn delete(&mut self, kind: &str, name: &str) -> std::result::Result<(), ProviderError> {
        if self.state.resources.remove(&key(kind, name)).is_none() {
            return Err(ProviderError::Rejected(format!(
                "{kind} '{name}' does not exist"
            )));
        }
        self.persist()
    }

    fn supports_update(&self, kind: &str) -> bool {
        !REPLACE_ON_CHANGE.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::{ApplyAction, Resource, reconcile};

    fn scratch_provider(dir: &tempfile::TempDir) -> LocalProvider {
        LocalProvider::open(&dir.path().join("provider.toml")).unwrap()
    }

    #[test]
    fn test_create_assigns_id_and_address() {
        let dir = tempfile::tempdir().unwrap();
        let mut provider = scratch_provider(&dir);

        let observed = provider
            .create("instance", "web", &BTreeMap::new())
            .unwrap();

        assert!(observed.id.starts_with("instance-"));
        assert!(observed.attribute("public_ip").is_some());
    }

    #[test]
    fn test_update_preserves_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut provider = scratch_provider(&dir);

        let created = provider.create("vpc", "net", &BTreeMap::new()).unwrap();
        let mut attrs = BTreeMap::new();
        attrs.insert("cidr_block".to_string(), "10.0.0.0/16".to_string());
        let updated = provider.update("vpc", "net", &attrs).unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.attribute("cidr_block"), Some("10.0.0.0/16"));
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provider.toml");

        {
            let mut provider = LocalProvider::open(&path).unwrap();
            provider.create("vpc", "net", &BTreeMap::new()).unwrap();
        }

        let provider = LocalProvider::open(&path).unwrap();
        let observed = provider.read("vpc", "net").unwrap();
        assert!(observed.is_some());
        assert!(provider.find_by_name("net").is_some());
    }

    #[test]
    fn test_instance_drift_forces_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let mut provider = scratch_provider(&dir);

        let desired =
            vec![Resource::new("instance", "web").with_attribute("instance_type", "t2.micro")];
        let first = reconcile(&mut provider, &desired);
        let first_id = first.state_of("web").unwrap().id.clone();

        let desired =
            vec![Resource::new("instance", "web").with_attribute("instance_type", "t3.micro")];
        let second = reconcile(&mut provider, &desired);
        let web = second.state_of("web").unwrap();

        assert_eq!(web.action, ApplyAction::Replaced);
        assert_ne!(web.id, first_id);
    }

    #[test]
    fn test_vpc_drift_updates_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut provider = scratch_provider(&dir);

        let desired = vec![Resource::new("vpc", "net").with_attribute("cidr_block", "10.0.0.0/16")];
        let first = reconcile(&mut provider, &desired);
        let first_id = first.state_of("net").unwrap().id.clone();

        let desired = vec![Resource::new("vpc", "net").with_attribute("cidr_block", "10.1.0.0/16")];
        let second = reconcile(&mut provider, &desired);
        let net = second.state_of("net").unwrap();

        assert_eq!(net.action, ApplyAction::Updated);
        assert_eq!(net.id, first_id);
    }
}
