//! Content loaders resolving patch references to raw bytes.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// LoadError is returned when a reference cannot be turned into content.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{reference}: not found")]
    NotFound { reference: String },

    #[error("{reference}: refusing to load outside of {root}")]
    OutsideRoot { reference: String, root: String },

    #[error("{reference}: {source}")]
    Io {
        reference: String,
        #[source]
        source: io::Error,
    },
}

/// Loader resolves a reference string to raw bytes.
pub trait Loader {
    fn load(&self, reference: &str) -> Result<Vec<u8>, LoadError>;
}

/// FileLoader reads files relative to a root directory and refuses to read
/// anything outside of it.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileLoader { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf, LoadError> {
        let candidate = Path::new(reference);
        let escapes = candidate.is_absolute()
            || candidate
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        if escapes {
            return Err(LoadError::OutsideRoot {
                reference: reference.to_string(),
                root: self.root.display().to_string(),
            });
        }
        Ok(self.root.join(candidate))
    }
}

impl Loader for FileLoader {
    fn load(&self, reference: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(reference)?;
        std::fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                reference: reference.to_string(),
            },
            _ => LoadError::Io {
                reference: reference.to_string(),
                source,
            },
        })
    }
}

/// MemoryLoader serves content from an in-memory table.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        MemoryLoader::default()
    }

    pub fn with_file(mut self, reference: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(reference.into(), content.into());
        self
    }
}

impl Loader for MemoryLoader {
    fn load(&self, reference: &str) -> Result<Vec<u8>, LoadError> {
        self.files
            .get(reference)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                reference: reference.to_string(),
            })
    }
}
