use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::StorageError;

/// Longest key accepted by S3-compatible stores.
const MAX_KEY_LEN: usize = 1024;

/// A validated, flat object key.
///
/// Keys never contain path separators, `..`, or control characters and never
/// start with a dot, so every backend can map them to a single object name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();

        if key.is_empty() {
            return Err(StorageError::InvalidKey("key cannot be empty".into()));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(format!(
                "key is {} bytes, limit is {MAX_KEY_LEN}",
                key.len()
            )));
        }
        if key.chars().any(|c| c.is_control()) {
            return Err(StorageError::InvalidKey(
                "control characters are not allowed".into(),
            ));
        }
        if key.contains('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "path separators are not allowed".into(),
            ));
        }
        if key.starts_with('.') {
            return Err(StorageError::InvalidKey(
                "key cannot start with '.'".into(),
            ));
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectKey({})", self.0)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How an object key is derived from an uploaded file's name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    /// The key is the filename itself. Two uploads with the same name share
    /// one object, and the last writer's bytes win.
    Filename,
    /// The key is the filename prefixed with a fresh UUIDv7, so every upload
    /// gets its own object.
    #[default]
    Unique,
}

impl KeyPolicy {
    /// Derive the object key for an upload named `filename`.
    pub fn derive(self, filename: &str) -> Result<ObjectKey, StorageError> {
        match self {
            Self::Filename => ObjectKey::new(filename),
            Self::Unique => ObjectKey::new(format!("{}-{filename}", Uuid::now_v7())),
        }
    }
}
