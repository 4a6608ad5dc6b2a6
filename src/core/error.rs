use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Manifest could not be fetched or parsed
    ManifestUnavailable,
    /// A single shard could not be fetched or parsed
    ShardLoadFailed,
    /// Load aborted by the caller or by its deadline
    LoadCancelled,
    InvalidPageSize,
    InvalidFilterValue,
    /// Raw record violates the normalization contract
    InvalidRecord,
    InvalidConfig,
    Io,
    Parse,
    Internal,
}

#[derive(Debug, ThisError)]
#[error("{kind:?}: {context}")]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error { kind, context: context.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// True for caller-initiated aborts, which consumers should not report as failures
    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::LoadCancelled
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: err.to_string(),
        }
    }
}

impl From<fst::Error> for Error {
    fn from(err: fst::Error) -> Self {
        Error {
            kind: ErrorKind::Internal,
            context: format!("FST error: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
