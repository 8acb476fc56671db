//! ledgerio - buffered write-back channel for append-only journals
//!
//! A journal or entry-log layer appends bytes through a [`BufferedChannel`]
//! at memory speed. The channel defers the physical write, bounds how many
//! bytes may sit unsynced, and serves reads at any logical offset whether
//! the bytes are on disk, still buffered, or split across both.
//!
//! # Quick Start
//!
//! ```ignore
//! use ledgerio::{BufferedChannel, ChannelConfig, SyncPolicy};
//!
//! let config = ChannelConfig::default().with_unpersisted_bytes_bound(1 << 20);
//! let channel = BufferedChannel::open("journal/current.txn", config, SyncPolicy::DataOnly)?;
//!
//! channel.write(b"entry")?;
//! let mut buf = [0u8; 5];
//! channel.read(&mut buf, 0, 5)?;
//! channel.close()?;
//! ```

pub use ledgerio_core::{
    AllocError, BackingStore, BufferAllocator, ChannelError, ChannelResult, ErrorKind,
};
pub use ledgerio_durability::{
    testing, BufferedChannel, ChannelConfig, ChannelConfigError, ChannelCounters, FileStore,
    HeapAllocator, MemoryStore, SyncPolicy,
};
