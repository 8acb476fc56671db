//! Core types and traits for ledgerio
//!
//! This crate defines the foundational types shared by the channel and
//! its collaborators:
//! - ChannelError: Error taxonomy for buffered channel operations
//! - ErrorKind: Coarse classification used by callers deciding on retries
//! - BackingStore: Positioned file capability consumed by the channel
//! - BufferAllocator: Source of fixed-capacity write buffers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;

pub use error::{AllocError, ChannelError, ChannelResult, ErrorKind};
pub use traits::{BackingStore, BufferAllocator};
