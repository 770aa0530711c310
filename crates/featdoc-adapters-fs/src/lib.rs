//! Document store adapters.

use featdoc_ports::DocumentStore;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Filesystem-backed document store.
///
/// Relative paths resolve against `root`. Missing parent directories are
/// created on write.
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store rooted at the process's working directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for FsDocumentStore {
    fn default() -> Self {
        Self::current_dir()
    }
}

impl DocumentStore for FsDocumentStore {
    fn read(&self, path: &Path) -> io::Result<Option<String>> {
        let full_path = self.resolve(path);
        match std::fs::read_to_string(&full_path) {
            Ok(content) => {
                tracing::trace!(
                    path = %full_path.display(),
                    bytes = content.len(),
                    "read document"
                );
                Ok(Some(content))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %full_path.display(), "no existing document");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let full_path = self.resolve(path);
        if let Some(parent) = full_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, content)?;
        tracing::debug!(path = %full_path.display(), bytes = content.len(), "wrote document");
        Ok(())
    }
}

/// In-memory document store, for hosts that post-process the report and for
/// tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<PathBuf, String>>,
    writes: Mutex<u32>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document.
    pub fn with_document(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(path.into(), content.into());
        }
        self
    }

    /// Current content of a document.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.documents
            .lock()
            .ok()
            .and_then(|documents| documents.get(path.as_ref()).cloned())
    }

    /// Number of writes performed so far.
    pub fn write_count(&self) -> u32 {
        self.writes.lock().map(|writes| *writes).unwrap_or(0)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self, path: &Path) -> io::Result<Option<String>> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| io::Error::other("document store poisoned"))?;
        Ok(documents.get(path).cloned())
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| io::Error::other("document store poisoned"))?;
        documents.insert(path.to_path_buf(), content.to_string());
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }
}
