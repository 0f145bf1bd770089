//! Conversion between the typed compiler input/output and standard json text

use super::{CompilationInput, CompilationOutput};
use serde_json::error::Category;

/// Failure to produce standard json from a [`CompilationInput`].
#[derive(Debug, thiserror::Error)]
#[error("failed to encode compiler input: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Failure to read a [`CompilationOutput`] from compiler output.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The text is not JSON, or it ends early.
    #[error("malformed compiler output at line {line} column {column}: {message}")]
    Malformed { line: usize, column: usize, message: String },
    /// Valid JSON whose shape does not match the expected output.
    #[error("unexpected compiler output at `{path}`: {message}")]
    Schema { path: String, message: String },
}

impl DecodeError {
    /// Returns `true` for output that is valid JSON of an unexpected shape.
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    fn new(path: String, err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => Self::Schema { path, message: err.to_string() },
            Category::Io | Category::Syntax | Category::Eof => {
                Self::Malformed { line: err.line(), column: err.column(), message: err.to_string() }
            }
        }
    }
}

/// Encodes the input as the standard json document solc reads.
///
/// Settings left unset are omitted rather than written as `null`.
pub fn encode(input: &CompilationInput) -> Result<String, EncodeError> {
    Ok(serde_json::to_string(input)?)
}

/// Decodes the standard json document solc writes.
pub fn decode(output: &str) -> Result<CompilationOutput, DecodeError> {
    decode_json(output.as_bytes())
}

/// Decodes any json document, reporting the path of a mismatching value. Invalid UTF-8 is
/// rejected as malformed.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut *de).map_err(|err| {
        let path = err.path().to_string();
        DecodeError::new(path, err.into_inner())
    })?;
    de.end().map_err(|err| DecodeError::new(String::from("."), err))?;
    Ok(value)
}
