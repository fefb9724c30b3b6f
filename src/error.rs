use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading tokenizer resources or decoding token ids.
///
/// Encoding and budget accounting never fail once an encoder exists; a merged
/// symbol missing from the vocabulary is logged and skipped instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid merge rule on line {line}: {text:?}")]
    MalformedMerge { line: usize, text: String },

    #[error("invalid {what}: {reason}")]
    InvalidResource { what: &'static str, reason: String },

    #[error("no decoding found for token {0}")]
    UnknownTokenId(u32),

    #[error("token {id} contains {symbol:?}, which is outside the byte alphabet")]
    UnknownSymbol { id: u32, symbol: char },

    #[error("tokenizer data not embedded (build with TOKENBUDGET_DATA or set it at runtime)")]
    MissingData,

    #[error("cannot read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
