//! Backing store implementations
//!
//! - `file`: Regular file with positioned I/O (FileStore, SyncPolicy)
//! - `memory`: Shared in-memory buffer (MemoryStore)

pub mod file;
pub mod memory;

pub use file::{FileStore, SyncPolicy};
pub use memory::MemoryStore;
