use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CertGenError, Result};
use crate::pem_utils::der_to_pem;

/// The two artifact kinds an issuance produces.
///
/// Each kind fixes both the PEM label and the file suffix convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Certificate,
    PrivateKey,
}

impl ArtifactKind {
    pub fn pem_label(self) -> &'static str {
        match self {
            ArtifactKind::Certificate => "CERTIFICATE",
            ArtifactKind::PrivateKey => "PRIVATE KEY",
        }
    }

    pub fn file_suffix(self) -> &'static str {
        match self {
            ArtifactKind::Certificate => "pem",
            ArtifactKind::PrivateKey => "key",
        }
    }
}

/// Persistence interface consumed by the issuer.
///
/// Implementations wrap the DER bytes in a PEM container with the kind's
/// label and write it under `<name>.<suffix>`. A failed save aborts the
/// issuing call; no cleanup of a partially written artifact is attempted.
pub trait ArtifactStore {
    fn save(&self, name: &str, kind: ArtifactKind, der: &[u8]) -> Result<()>;
}

/// Filesystem store writing PEM artifacts into a single directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Creates a store rooted at `dir`. The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str, kind: ArtifactKind) -> PathBuf {
        self.dir.join(format!("{name}.{}", kind.file_suffix()))
    }
}

impl ArtifactStore for DirStore {
    fn save(&self, name: &str, kind: ArtifactKind, der: &[u8]) -> Result<()> {
        let path = self.path_for(name, kind);
        let pem = der_to_pem(der, kind.pem_label());
        fs::write(&path, pem).map_err(|source| CertGenError::Persistence {
            path: path.display().to_string(),
            source,
        })
    }
}
