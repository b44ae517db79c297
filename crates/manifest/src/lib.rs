//! # Manifest
//!
//! Declaration files for fazenda.
//!
//! Two TOML formats: a resources file (what should exist, with
//! dependencies) and a playbook file (how to configure the provisioned
//! host). Both round-trip through parse → serialize → re-parse without
//! loss, and both are validated at load time so graph and runner errors
//! surface before anything touches a provider or a host.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let set = manifest::load_resources(Path::new("infra.toml"))?;
//! let playbook = manifest::load_playbook(Path::new("steps.toml"))?;
//! println!("{} resources, {} steps", set.resources.len(), playbook.steps.len());
//! # Ok::<(), manifest::Error>(())
//! ```
//!
//! Secrets never live in these files: the playbook's credential field is a
//! reference (key path, environment variable name) resolved by the caller.

mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Playbook, ResourceSet, TargetDecl};

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Load and validate a resources declaration file.
pub fn load_resources(path: &Path) -> Result<ResourceSet> {
    let content = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let set: ResourceSet = toml::from_str(&content).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_resources(&set)?;
    Ok(set)
}

/// Serialize a resource set back to disk.
pub fn save_resources(path: &Path, set: &ResourceSet) -> Result<()> {
    let content = toml::to_string_pretty(set)?;
    fs::write(path, content).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate a playbook file.
pub fn load_playbook(path: &Path) -> Result<Playbook> {
    let content = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let playbook: Playbook = toml::from_str(&content).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_playbook(&playbook)?;
    Ok(playbook)
}

/// Serialize a playbook back to disk.
pub fn save_playbook(path: &Path, playbook: &Playbook) -> Result<()> {
    let content = toml::to_string_pretty(playbook)?;
    fs::write(path, content).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Check resource declarations: nonempty identities, unique names, known
/// dependency references.
pub fn validate_resources(set: &ResourceSet) -> Result<()> {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for resource in &set.resources {
        if resource.kind.is_empty() {
            return Err(Error::Empty {
                what: format!("kind of resource '{}'", resource.name),
            });
        }
        if resource.name.is_empty() {
            return Err(Error::Empty {
                what: "resource name".to_string(),
            });
        }
        if !names.insert(resource.name.as_str()) {
            return Err(Error::DuplicateResource {
                name: resource.name.clone(),
            });
        }
    }

    for resource in &set.resources {
        for dep in &resource.depends_on {
            if !names.contains(dep.as_str()) {
                return Err(Error::UnknownDependency {
                    resource: resource.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Check a playbook: an address source, a login user, named steps with
/// nonempty commands.
pub fn validate_playbook(playbook: &Playbook) -> Result<()> {
    if playbook.target.address.is_none() && playbook.target.resource.is_none() {
        return Err(Error::NoAddress);
    }
    if playbook.target.user.is_empty() {
        return Err(Error::Empty {
            what: "target user".to_string(),
        });
    }
    for step in &playbook.steps {
        if step.name.is_empty() {
            return Err(Error::Empty {
                what: "step name".to_string(),
            });
        }
        if step.command.is_empty() {
            return Err(Error::Empty {
                what: format!("command of step '{}'", step.name),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostrun::{ConfigStep, CredentialRef, ReadinessProbe};
    use reconcile::Resource;

    fn sample_set() -> ResourceSet {
        ResourceSet {
            resources: vec![
                Resource::new("vpc", "main").with_attribute("cidr_block", "10.0.0.0/16"),
                Resource::new("subnet", "app")
                    .with_attribute("cidr_block", "10.0.1.0/24")
                    .with_dependency("main"),
                Resource::new("instance", "web")
                    .with_attribute("instance_type", "t3.micro")
                    .with_dependency("app"),
            ],
        }
    }

    fn sample_playbook() -> Playbook {
        Playbook {
            target: TargetDecl {
                resource: Some("web".to_string()),
                address_attribute: "public_ip".to_string(),
                address: None,
                user: "admin".to_string(),
                credential: CredentialRef::KeyFile {
                    path: "~/.ssh/id_ed25519".to_string(),
                },
                probe: ReadinessProbe {
                    expect: "OpenSSH".to_string(),
                    ..ReadinessProbe::default()
                },
            },
            steps: vec![
                ConfigStep::new("install_docker", "apt-get install -y docker-ce"),
                ConfigStep::new("create_user", "useradd -m deploy").run_as("root"),
                ConfigStep::new("start_containers", "docker compose up -d")
                    .run_as("deploy")
                    .not_idempotent(),
            ],
        }
    }

    #[test]
    fn test_resources_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("infra.toml");

        let set = sample_set();
        save_resources(&path, &set).unwrap();
        let reloaded = load_resources(&path).unwrap();
        assert_eq!(set, reloaded);

        // A second round trip is byte-stable.
        let first = fs::read_to_string(&path).unwrap();
        save_resources(&path, &reloaded).unwrap();
        assert_eq!(first, fs::read_to_string(&path).unwrap());
    }

    #[test]
    fn test_playbook_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steps.toml");

        let playbook = sample_playbook();
        save_playbook(&path, &playbook).unwrap();
        assert_eq!(playbook, load_playbook(&path).unwrap());
    }

    #[test]
    fn test_parses_handwritten_toml() {
        let content = r#"
            [[resources]]
            kind = "vpc"
            name = "main"

            [resources.attributes]
            cidr_block = "10.0.0.0/16"

            [[resources]]
            kind = "subnet"
            name = "app"
            depends_on = ["main"]
        "#;
        let set: ResourceSet = toml::from_str(content).unwrap();
        assert_eq!(set.resources.len(), 2);
        assert_eq!(set.resources[1].depends_on, vec!["main".to_string()]);
        validate_resources(&set).unwrap();
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut set = sample_set();
        set.resources.push(Resource::new("vpc", "main"));
        assert!(matches!(
            validate_resources(&set),
            Err(Error::DuplicateResource { .. })
        ));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let mut set = sample_set();
        set.resources.push(Resource::new("vpc", "orphan").with_dependency("nowhere"));
        match validate_resources(&set) {
            Err(Error::UnknownDependency { resource, dependency }) => {
                assert_eq!(resource, "orphan");
                assert_eq!(dependency, "nowhere");
            }
            other => panic!("expected unknown dependency error, got {other:?}"),
        }
    }

    #[test]
    fn test_playbook_without_address_source_rejected() {
        let mut playbook = sample_playbook();
        playbook.target.resource = None;
        assert!(matches!(validate_playbook(&playbook), Err(Error::NoAddress)));
    }

    #[test]
    fn test_empty_command_rejected() {
        let mut playbook = sample_playbook();
        playbook.steps.push(ConfigStep::new("noop", ""));
        assert!(matches!(
            validate_playbook(&playbook),
            Err(Error::Empty { .. })
        ));
    }
}
