use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FileError>;

/// Win32 error codes this crate categorizes; everything else stays opaque.
pub const ERROR_FILE_NOT_FOUND: u32 = 2;
pub const ERROR_PATH_NOT_FOUND: u32 = 3;
pub const ERROR_ACCESS_DENIED: u32 = 5;
pub const ERROR_WRITE_PROTECT: u32 = 19;
pub const ERROR_SHARING_VIOLATION: u32 = 32;
pub const ERROR_LOCK_VIOLATION: u32 = 33;
pub const ERROR_FILE_EXISTS: u32 = 80;
pub const ERROR_ALREADY_EXISTS: u32 = 183;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A native call failed with an error code that has no dedicated variant.
    #[error("native call failed with code {code}: {path}")]
    NativeFailure { code: u32, path: String },

    /// Errors surfaced verbatim by the conventional std::fs branch.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl FileError {
    /// Categorize a nonzero Win32 error code. Callers are responsible for
    /// the code-zero suppression rule; zero never reaches this function on
    /// the suppressed paths.
    pub fn from_code(code: u32, path: &str) -> Self {
        let path = path.to_string();
        match code {
            ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND => FileError::NotFound(path),
            ERROR_ACCESS_DENIED
            | ERROR_WRITE_PROTECT
            | ERROR_SHARING_VIOLATION
            | ERROR_LOCK_VIOLATION => FileError::AccessDenied(path),
            ERROR_FILE_EXISTS | ERROR_ALREADY_EXISTS => FileError::AlreadyExists(path),
            _ => FileError::NativeFailure { code, path },
        }
    }

    /// Categorize an error from the conventional branch the same way the
    /// native codes are categorized, so callers see one error surface.
    pub fn from_io(err: io::Error, path: &str) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FileError::NotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => FileError::AccessDenied(path.to_string()),
            io::ErrorKind::AlreadyExists => FileError::AlreadyExists(path.to_string()),
            _ => FileError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_maps_known_codes() {
        assert!(matches!(
            FileError::from_code(ERROR_FILE_NOT_FOUND, "x"),
            FileError::NotFound(_)
        ));
        assert!(matches!(
            FileError::from_code(ERROR_PATH_NOT_FOUND, "x"),
            FileError::NotFound(_)
        ));
        assert!(matches!(
            FileError::from_code(ERROR_SHARING_VIOLATION, "x"),
            FileError::AccessDenied(_)
        ));
        assert!(matches!(
            FileError::from_code(ERROR_FILE_EXISTS, "x"),
            FileError::AlreadyExists(_)
        ));
    }

    #[test]
    fn test_from_code_keeps_unknown_codes_opaque() {
        match FileError::from_code(1117, "x") {
            FileError::NativeFailure { code, .. } => assert_eq!(code, 1117),
            other => panic!("Expected NativeFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_from_io_maps_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            FileError::from_io(err, "x"),
            FileError::NotFound(_)
        ));
    }
}
