/// Longest filename accepted for an upload, in bytes.
pub const MAX_FILENAME_LEN: usize = 255;

/// Why an upload filename was rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    TooLong,
    /// Filename contains `/` or `\`.
    ContainsPathSeparator,
    PathTraversal,
    NullByte,
    /// Filename starts with a dot.
    Hidden,
    /// Filename contains control characters (CR, LF, etc.).
    ControlCharacter,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::TooLong => "Filename exceeds 255 bytes",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::Hidden => "Invalid filename: hidden files (starting with '.') are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Validates an upload filename and returns it trimmed.
///
/// The result is always a usable object key: one flat name, no directory
/// parts, and nothing that could break the `Content-Disposition` header it
/// ends up in.
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }
    if trimmed.len() > MAX_FILENAME_LEN {
        return Err(FilenameError::TooLong);
    }
    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }
    // CRLF here would inject headers into the download response.
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }
    if trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }
    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(trimmed)
}
