//! Artifact storage.
//!
//! Jobs read and write whole named artifacts (the event log, projections,
//! the cursor) through [`ContentStore`]. Writes replace the artifact
//! wholesale; there are no partial updates.
//!
//! - [`FsStore`]: a directory on disk, written atomically
//! - [`MemoryStore`]: a map behind a mutex, for tests and dry runs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{AdvocateError, Result};
use crate::util::{atomic_write, read_optional};

/// MIME type of JSON artifacts.
pub const JSON_MIME: &str = "application/json";

/// MIME type of text artifacts.
pub const TEXT_MIME: &str = "text/plain";

/// Sidecar recording the MIME type of each artifact in an [`FsStore`].
pub const CONTENT_TYPES_FILE: &str = ".content-types.json";

/// A flat namespace of text artifacts.
pub trait ContentStore: Send + Sync {
    /// Read an artifact, or `None` when it does not exist.
    fn try_read(&self, name: &str) -> Result<Option<String>>;

    /// Replace an artifact.
    fn write(&self, name: &str, content: &str, mime: &str) -> Result<()>;

    /// Read an artifact that must exist.
    fn read(&self, name: &str) -> Result<String> {
        self.try_read(name)?
            .ok_or_else(|| AdvocateError::ArtifactNotFound {
                name: name.to_string(),
            })
    }

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

impl<S: ContentStore + ?Sized> ContentStore for &S {
    fn try_read(&self, name: &str) -> Result<Option<String>> {
        (**self).try_read(name)
    }

    fn write(&self, name: &str, content: &str, mime: &str) -> Result<()> {
        (**self).write(name, content, mime)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

fn check_name(name: &str) -> Result<()> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && name != CONTENT_TYPES_FILE
        && !name.contains(['/', '\\']);
    if plain {
        Ok(())
    } else {
        Err(AdvocateError::InvalidArgument {
            name: "artifact".to_string(),
            reason: format!("'{name}' is not a plain artifact name"),
        })
    }
}

/// Artifacts stored as files in one directory.
///
/// The directory is created on first write.
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
    // Serializes sidecar read-modify-write cycles within the process.
    types_lock: Mutex<()>,
}

impl FsStore {
    /// Store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            types_lock: Mutex::new(()),
        }
    }

    /// Directory holding the artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of an artifact.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Recorded MIME type of an artifact.
    pub fn content_type(&self, name: &str) -> Result<Option<String>> {
        Ok(self.content_types()?.remove(name))
    }

    fn content_types(&self) -> Result<BTreeMap<String, String>> {
        let path = self.root.join(CONTENT_TYPES_FILE);
        match read_optional(&path)? {
            Some(text) => serde_json::from_str(&text).map_err(|e| {
                AdvocateError::SerializationError {
                    context: format!("Failed to parse {}", path.display()),
                    source: e,
                }
            }),
            None => Ok(BTreeMap::new()),
        }
    }

    fn record_content_type(&self, name: &str, mime: &str) -> Result<()> {
        let _guard = self.types_lock.lock();
        let mut types = self.content_types()?;
        if types.get(name).map(String::as_str) == Some(mime) {
            return Ok(());
        }
        types.insert(name.to_string(), mime.to_string());
        let json = serde_json::to_string_pretty(&types)?;
        atomic_write(self.root.join(CONTENT_TYPES_FILE), json.as_bytes())
    }
}

impl ContentStore for FsStore {
    fn try_read(&self, name: &str) -> Result<Option<String>> {
        check_name(name)?;
        read_optional(self.path_of(name))
    }

    fn write(&self, name: &str, content: &str, mime: &str) -> Result<()> {
        check_name(name)?;
        atomic_write(self.path_of(name), content.as_bytes())?;
        self.record_content_type(name, mime)?;
        tracing::debug!(name, mime, bytes = content.len(), "Artifact written");
        Ok(())
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// One stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    /// Content.
    pub content: String,
    /// MIME type given at write time.
    pub mime: String,
}

/// Artifacts held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: Mutex<BTreeMap<String, StoredArtifact>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifact with its MIME type.
    pub fn get(&self, name: &str) -> Option<StoredArtifact> {
        self.artifacts.lock().get(name).cloned()
    }

    /// Names of the stored artifacts, sorted.
    pub fn names(&self) -> Vec<String> {
        self.artifacts.lock().keys().cloned().collect()
    }
}

impl ContentStore for MemoryStore {
    fn try_read(&self, name: &str) -> Result<Option<String>> {
        check_name(name)?;
        Ok(self.artifacts.lock().get(name).map(|a| a.content.clone()))
    }

    fn write(&self, name: &str, content: &str, mime: &str) -> Result<()> {
        check_name(name)?;
        self.artifacts.lock().insert(
            name.to_string(),
            StoredArtifact {
                content: content.to_string(),
                mime: mime.to_string(),
            },
        );
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
