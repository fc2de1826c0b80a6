use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CREDENTIAL_ENV_FALLBACK: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialStoreError {
    #[error("credential cannot be empty")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Stored,
    Environment,
}

impl CredentialSource {
    pub fn label(self) -> &'static str {
        match self {
            CredentialSource::Stored => "stored",
            CredentialSource::Environment => CREDENTIAL_ENV_FALLBACK,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub key: String,
    pub source: CredentialSource,
}

impl ResolvedCredential {
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.key)
    }
}

/// Single-line API key file. No locking; last writer wins.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CredentialStoreError::Empty.into());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut file = open_private(&self.path)?;
        writeln!(file, "{key}")
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Stored key, or `None` when the file is absent or blank.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let key = raw.trim();
        if key.is_empty() {
            return Ok(None);
        }
        Ok(Some(key.to_string()))
    }

    /// Returns whether a stored credential was removed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("failed to remove {}", self.path.display()))?;
        Ok(true)
    }

    pub fn resolve(&self) -> Result<Option<ResolvedCredential>> {
        if let Some(key) = self.load()? {
            return Ok(Some(ResolvedCredential {
                key,
                source: CredentialSource::Stored,
            }));
        }
        match env::var(CREDENTIAL_ENV_FALLBACK) {
            Ok(v) if !v.trim().is_empty() => Ok(Some(ResolvedCredential {
                key: v.trim().to_string(),
                source: CredentialSource::Environment,
            })),
            _ => Ok(None),
        }
    }
}

/// First 12 hex chars of the key's SHA-256.
pub fn fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..12].to_string()
}

/// Open for writing with owner-only permissions, before any byte lands. A
/// pre-existing file is narrowed too.
#[cfg(unix)]
fn open_private(path: &Path) -> Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.set_permissions(fs::Permissions::from_mode(0o600))
        .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))
}
