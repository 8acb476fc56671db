//! Durability layer for ledgerio
//!
//! This crate handles everything that touches disk:
//!
//! - Buffered channel: Write-back tail buffer over an append-only file
//! - Forced syncs: Bound on bytes accepted but not yet synced
//! - Backing stores: Positioned file I/O and an in-memory store
//! - Buffer allocation: Fallible heap allocation of write buffers
//! - Fault injection for failure testing

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod allocator; // Write buffer allocation
pub mod channel; // Buffered write-back channel and its configuration
pub mod store; // FileStore, MemoryStore
pub mod testing; // Fault-injecting store and allocator

// === Re-exports ===
pub use allocator::HeapAllocator;
pub use channel::{BufferedChannel, ChannelConfig, ChannelConfigError, ChannelCounters};
pub use store::{FileStore, MemoryStore, SyncPolicy};

// Testing utilities
pub use testing::{FailingAllocator, FaultHandle, FaultPoint, FaultyStore};
