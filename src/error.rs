use crate::artifacts::codec::EncodeError;
use std::{io, path::Path};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolcError>;

/// Failures surfaced by this crate.
///
/// The variant, not the message, identifies where a failure came from: a decode failure of the
/// compiler's output is a [`SolcError::CompilationFailed`], while the same failure on the release
/// index is a [`SolcError::Download`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SolcError {
    /// Network or filesystem failure while fetching the release index or a compiler artifact
    #[error("download failed: {0}")]
    Download(String),
    /// The requested version is not listed in the release index
    #[error("solc version {0} not found in release index")]
    VersionNotFound(String),
    /// The compiler module could not be loaded or failed its version probe
    #[error("compiler module error: {0}")]
    Ffi(String),
    /// The request document could not be encoded
    #[error("invalid compiler input: {0}")]
    InvalidInput(String),
    /// The compiler rejected the request or returned output that does not decode
    #[error("compilation failed: {0}")]
    CompilationFailed(String),
}

impl SolcError {
    pub(crate) fn download(msg: impl std::fmt::Display) -> Self {
        SolcError::Download(msg.to_string())
    }

    pub(crate) fn download_io(err: io::Error, path: &Path) -> Self {
        SolcError::Download(format!("\"{}\": {err}", path.display()))
    }

    pub(crate) fn ffi(msg: impl std::fmt::Display) -> Self {
        SolcError::Ffi(msg.to_string())
    }

    pub(crate) fn compilation(msg: impl std::fmt::Display) -> Self {
        SolcError::CompilationFailed(msg.to_string())
    }

    /// Returns `true` if this error was caused by the network or the local filesystem.
    pub fn is_download(&self) -> bool {
        matches!(self, SolcError::Download(_))
    }

    /// Returns the human readable message carried by the error.
    pub fn message(&self) -> &str {
        match self {
            SolcError::Download(msg)
            | SolcError::VersionNotFound(msg)
            | SolcError::Ffi(msg)
            | SolcError::InvalidInput(msg)
            | SolcError::CompilationFailed(msg) => msg,
        }
    }
}

impl From<EncodeError> for SolcError {
    fn from(err: EncodeError) -> Self {
        SolcError::InvalidInput(err.to_string())
    }
}
