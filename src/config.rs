//! Application paths and out-of-band secret resolution.
//!
//! Declaration files carry credential references only. The secret value
//! itself (key material, a registry password) comes from the environment or
//! from a key file on disk, resolved here at run time.

use anyhow::{Context, Result, bail};
use hostrun::CredentialRef;
use std::fmt;
use std::path::{Path, PathBuf};

/// Resolved credential material.
#[derive(Clone)]
pub enum CredentialMaterial {
    /// Private key on disk, tilde-expanded
    KeyPath(PathBuf),
    /// Secret value taken from the environment
    Token(String),
    /// Ambient agent authentication
    Agent,
}

// Hand-written so token values never reach logs.
impl fmt::Debug for CredentialMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyPath(path) => f.debug_tuple("KeyPath").field(path).finish(),
            Self::Token(_) => f.write_str("Token(<redacted>)"),
            Self::Agent => f.write_str("Agent"),
        }
    }
}

/// Directory holding provider state (~/.local/state/fazenda)
pub fn state_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".local").join("state").join("fazenda"))
}

/// Provider state file path, honoring an explicit override.
pub fn state_file(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(state_dir()?.join("provider.toml")),
    }
}

/// Resolve a credential reference to usable material.
pub fn resolve_credential(credential: &CredentialRef) -> Result<CredentialMaterial> {
    match credential {
        CredentialRef::KeyFile { path } => {
            let expanded = shellexpand::tilde(path);
            let path = PathBuf::from(expanded.as_ref());
            if !path.exists() {
                bail!("key file not found: {}", path.display());
            }
            Ok(CredentialMaterial::KeyPath(path))
        }
        CredentialRef::Env { var } => {
            let value = std::env::var(var)
                .with_context(|| format!("environment variable {var} is not set"))?;
            Ok(CredentialMaterial::Token(value))
        }
        CredentialRef::Agent => Ok(CredentialMaterial::Agent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_credential_resolves() {
        // PATH is always present in a test environment
        let material =
            resolve_credential(&CredentialRef::Env { var: "PATH".to_string() }).unwrap();
        assert!(matches!(material, CredentialMaterial::Token(_)));
        // Debug output must not leak the value
        assert_eq!(format!("{material:?}"), "Token(<redacted>)");
    }

    #[test]
    fn test_missing_env_credential_errors() {
        let result =
            resolve_credential(&CredentialRef::Env { var: "FAZENDA_TEST_UNSET".to_string() });
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_key_file_errors() {
        let result = resolve_credential(&CredentialRef::KeyFile {
            path: "/nonexistent/id_ed25519".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_key_file_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("id_ed25519");
        std::fs::write(&key, "not a real key").unwrap();

        let material = resolve_credential(&CredentialRef::KeyFile {
            path: key.to_string_lossy().into_owned(),
        })
        .unwrap();
        assert!(matches!(material, CredentialMaterial::KeyPath(p) if p == key));
    }
}
