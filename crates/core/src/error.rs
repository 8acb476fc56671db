//! Error types for ledgerio
//!
//! This module defines the error taxonomy shared by the buffered channel
//! and its collaborators. We use `thiserror` for automatic `Display` and
//! `Error` trait implementations.
//!
//! Every failure is synchronous and leaves the channel's accounting
//! unchanged. Retry policy belongs to the caller (the journal layer).

use std::io;
use thiserror::Error;

/// Result type alias for channel operations
pub type ChannelResult<T> = std::result::Result<T, ChannelError>;

/// Error types for the buffered channel
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Negative position/length/capacity, or a position that names an
    /// offset that has never been written.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The destination cannot hold the requested number of bytes.
    #[error("Destination too small: need {required} bytes, have {available}")]
    DestinationTooSmall {
        /// Bytes requested by the caller
        required: usize,
        /// Bytes the destination can hold
        available: usize,
    },

    /// The requested range extends past the logical end of the stream.
    #[error("Read past end: [{position}, {position}+{length}) exceeds logical end {logical_end}")]
    Underflow {
        /// Requested start offset
        position: u64,
        /// Requested byte count
        length: u64,
        /// Logical end of the stream at the time of the read
        logical_end: u64,
    },

    /// The backing store stopped returning bytes before the range was served.
    #[error("Short read at offset {offset}: wanted {wanted} bytes, got {got}")]
    ShortRead {
        /// Store offset where the read began
        offset: u64,
        /// Bytes requested from the store
        wanted: usize,
        /// Bytes the store delivered before returning 0
        got: usize,
    },

    /// The write buffer could not be obtained from the allocator.
    #[error("Write buffer unavailable: {0}")]
    BufferUnavailable(#[from] AllocError),

    /// Backing store failure, propagated verbatim.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Operation attempted after `close`.
    #[error("Channel closed")]
    Closed,
}

/// Coarse classification of a [`ChannelError`].
///
/// An absent source or destination buffer cannot be expressed through the
/// channel API (both are borrowed slices), so there is no null-reference
/// kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller supplied an argument outside the valid domain
    InvalidArgument,
    /// Requested bytes do not exist yet, on disk or in the buffer
    Range,
    /// Backing store fault
    Io,
    /// No usable write buffer
    Unavailable,
    /// Channel is closed
    Closed,
}

impl ChannelError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChannelError::InvalidArgument(_) | ChannelError::DestinationTooSmall { .. } => {
                ErrorKind::InvalidArgument
            }
            ChannelError::Underflow { .. } | ChannelError::ShortRead { .. } => ErrorKind::Range,
            ChannelError::BufferUnavailable(_) => ErrorKind::Unavailable,
            ChannelError::Io(_) => ErrorKind::Io,
            ChannelError::Closed => ErrorKind::Closed,
        }
    }

    /// Shorthand for an `InvalidArgument` error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        ChannelError::InvalidArgument(msg.into())
    }
}

/// Buffer allocation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to allocate {requested} byte buffer: {reason}")]
pub struct AllocError {
    /// Requested capacity in bytes
    pub requested: usize,
    /// Allocator-specific description
    pub reason: String,
}

impl AllocError {
    /// Create an allocation error.
    pub fn new(requested: usize, reason: impl Into<String>) -> Self {
        AllocError {
            requested,
            reason: reason.into(),
        }
    }
}
