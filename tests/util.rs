#![allow(dead_code)]

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use certgen::error::{CertGenError, Result};
use certgen::store::{ArtifactKind, ArtifactStore};

/// In-memory store recording every save, used to assert what the issuer
/// persisted (and that validation failures persist nothing).
#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<(String, ArtifactKind, Vec<u8>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn get(&self, name: &str, kind: ArtifactKind) -> Option<Vec<u8>> {
        self.saved
            .lock()
            .unwrap()
            .iter()
            .find(|(n, k, _)| n == name && *k == kind)
            .map(|(_, _, der)| der.clone())
    }
}

impl ArtifactStore for MemoryStore {
    fn save(&self, name: &str, kind: ArtifactKind, der: &[u8]) -> Result<()> {
        self.saved
            .lock()
            .unwrap()
            .push((name.to_string(), kind, der.to_vec()));
        Ok(())
    }
}

/// Store whose saves always fail, for exercising the persistence error path.
pub struct FailingStore;

impl ArtifactStore for FailingStore {
    fn save(&self, name: &str, kind: ArtifactKind, _der: &[u8]) -> Result<()> {
        Err(CertGenError::Persistence {
            path: format!("{name}.{}", kind.file_suffix()),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "store is read-only"),
        })
    }
}

/// A scratch directory under the system temp dir, unique per test.
pub fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("certgen-test-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("failed to create scratch dir");
    dir
}
