use std::fmt;

/// Errors that can occur during blob storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// No blob is stored under the requested key.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The object key is not usable by the store.
    InvalidKey(String),
    /// The blob exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The remote object store rejected or failed the request.
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "blob not found: {key}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidKey(msg) => write!(f, "invalid object key: {msg}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "blob exceeds size limit ({actual} > {limit} bytes)")
            }
            Self::Backend(msg) => write!(f, "object store error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "object-storage")]
impl From<::s3::error::S3Error> for StorageError {
    fn from(err: ::s3::error::S3Error) -> Self {
        Self::Backend(err.to_string())
    }
}
