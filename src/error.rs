//! Typed error kinds with operation-scoped wrapping.
//!
//! Every client operation wraps the underlying collaborator failure in
//! [`Error::Operation`], preserving the source chain so callers can inspect
//! the root cause via [`Error::root`] or `std::error::Error::source`.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure kinds surfaced by the memory engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed configuration, detected before any collaborator is contacted.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A collaborator could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The embedding provider failed to produce a vector.
    #[error("embedding generation failed: {0}")]
    EmbeddingFailed(String),

    /// A near-duplicate memory was detected. Informational: the write path
    /// resolves duplicates by merging, so this is not normally surfaced.
    #[error("duplicate memory detected: {id}")]
    DuplicateMemory { id: String },

    /// Caller-supplied input violated an invariant (empty user_id, embedding
    /// dimension mismatch, bad identifier).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No memory exists with the given ID.
    #[error("memory not found: {id}")]
    NotFound { id: String },

    /// The vector store failed; the driver error is kept as the source.
    #[error("storage operation failed: {source}")]
    Storage {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The text-generation provider failed. Present for the sibling LLM
    /// component; the memory core itself never emits this.
    #[error("llm operation failed: {0}")]
    Llm(String),

    /// The operation's cancellation token was triggered.
    #[error("operation cancelled")]
    Cancelled,

    /// The client was closed before this operation started.
    #[error("client is closed")]
    Closed,

    /// A core operation failed; wraps the cause with the operation name.
    #[error("memoir: {op}: {source}")]
    Operation {
        op: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Construct a storage error from any driver error.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Storage {
            source: Box::new(source),
        }
    }

    /// Wrap this error with an operation name. Cancellation passes through
    /// bare, matching the contract that a cancelled operation reports
    /// cancellation and nothing else.
    pub(crate) fn with_op(self, op: &'static str) -> Self {
        match self {
            Error::Cancelled => Error::Cancelled,
            other => Error::Operation {
                op,
                source: Box::new(other),
            },
        }
    }

    /// Walk through [`Error::Operation`] wrappers to the root cause.
    pub fn root(&self) -> &Error {
        let mut cur = self;
        while let Error::Operation { source, .. } = cur {
            cur = source;
        }
        cur
    }
}
