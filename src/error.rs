use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// Use of Internal is never a guarantee the error is not caused by the
    /// user - merely that it cannot be confidently determined by the code.
    Internal,

    /// The user provided invalid input (a wrong key, a path that does not
    /// exist, a file that is not ciphertext).
    User,
}

/// Fine-grained condition flags for cipher failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The ciphertext does not carry the `Salted__` envelope.
    ArmoringInvalid,
    /// Base64 decoding of the ciphertext failed.
    ArmoringDecode,
    /// Input ended before the salt or the first cipher block.
    TruncatedInput,
    /// Cipher body length is not a multiple of the AES block size.
    BinaryFormat,
    /// PKCS#7 padding did not verify. Almost always a wrong key, otherwise
    /// corruption.
    BadPadding,
    /// Decrypted bytes are not valid UTF-8 text.
    InvalidUtf8,
    /// Unexpected state reached within aeslib logic.
    InternalInvariant,
}

/// A failure of the cipher primitive.
///
/// The facade in [`crate::file_ops`] collapses these into `None`; the
/// [`crate::Cipher`] implementations return them so the cause can be logged
/// or inspected by callers that talk to the cipher directly.
#[derive(Debug, Error)]
#[error("{msg}")]
pub struct CipherError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag. Consumers MUST handle the absence
    /// of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl CipherError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// The file system step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOperation {
    Read,
    CreateDirectory,
    Write,
}

impl fmt::Display for FsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            FsOperation::Read => "read from",
            FsOperation::CreateDirectory => "create directory",
            FsOperation::Write => "write to",
        };
        f.write_str(verb)
    }
}

/// A failure reading the source file or applying a [`crate::WriteEffect`].
///
/// Never collapsed into `None`: a permission problem must not look like a
/// wrong key.
#[derive(Debug, Error)]
#[error("failed to {operation} {}", .path.display())]
pub struct FileSystemError {
    pub category: ErrorCategory,
    pub operation: FsOperation,
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl FileSystemError {
    /// Classifies `source` as a user error when the path is missing or not
    /// accessible, and as internal otherwise.
    pub fn new(operation: FsOperation, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let category = match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => ErrorCategory::User,
            _ => ErrorCategory::Internal,
        };
        Self {
            category,
            operation,
            path: path.into(),
            source,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying I/O error kind, for callers that branch on it.
    pub fn io_kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

/// Result of a cipher operation.
pub type CipherResult<T> = std::result::Result<T, CipherError>;

/// Result of a file system operation.
pub type FsResult<T> = std::result::Result<T, FileSystemError>;
