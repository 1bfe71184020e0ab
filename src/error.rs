//! Error types for the stream synchronization engine.

use thiserror::Error;

/// Errors surfaced by a transport stream.
///
/// All variants are `Clone` so errors can travel inside events the way
/// batch results do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The stream was cancelled, either locally or by the remote end.
    #[error("stream cancelled")]
    Cancelled,

    /// The underlying connection failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The transport gave up waiting for data.
    #[error("stream timed out")]
    Timeout,

    /// The consumer rejected delivered content and the stream was destroyed.
    #[error("content rejected: {0}")]
    Rejected(String),
}

impl StreamError {
    /// Whether this error is a cancellation.
    ///
    /// Cancellations are absorbed silently during teardown; every other
    /// error goes through the retry machinery.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }
}

/// Errors produced by the SPV chain collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A header failed validation (bad proof of work, malformed, known
    /// invalid).
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A header or batch does not connect to the chain state.
    #[error("header does not connect: {0}")]
    NonContiguous(String),

    /// The chain's own state is broken. Not recoverable by retrying the
    /// delivering stream.
    #[error("chain state error: {0}")]
    Internal(String),
}

impl ChainError {
    /// Whether this error is a semantic rejection of the delivered headers.
    ///
    /// Rejections destroy the delivering stream and let the retry machinery
    /// recover; anything else is fatal to the current run.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, ChainError::Internal(_))
    }
}

/// Engine-level errors for readers and providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// `to_height` is below `from_height`.
    #[error("invalid height range: {from_height}..={to_height}")]
    InvalidRange {
        from_height: u32,
        to_height: u32,
    },

    /// Heights start at 1.
    #[error("invalid start height: {0}")]
    InvalidHeight(u32),

    /// A historical plan or continuous subscription is already live.
    #[error("operation already running")]
    AlreadyRunning,

    /// The provider is not in a state that allows the requested operation.
    #[error("provider is busy: {0}")]
    Busy(&'static str),

    /// No stream opener was configured.
    #[error("no stream opener configured")]
    NotConfigured,

    /// A sub-stream ran out of retries; carries the last transport error.
    #[error("retries exhausted: {0}")]
    RetriesExhausted(StreamError),

    /// Opening a replacement stream failed during retry.
    #[error("failed to open replacement stream: {0}")]
    Reopen(StreamError),

    /// Building the BIP37 filter failed.
    #[error("bloom filter error: {0}")]
    Filter(String),

    /// Transport error.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// Chain collaborator error.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Type alias for Result with SyncError.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Type alias for chain collaborator results.
pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Type alias for stream operation results.
pub type StreamResult<T> = std::result::Result<T, StreamError>;
