//! Buffered write-back channel.
//!
//! Appends land in an in-memory tail buffer and reach the backing store
//! when the buffer would overflow, when the caller flushes, or when the
//! unsynced byte count crosses the configured bound. Readers see one
//! logical stream regardless of where its bytes currently live:
//!
//! ```text
//!  0                 flushed_boundary            logical_end
//!  |---- backing store ----|------ write buffer ------|
//! ```
//!
//! A read range is served from the store, from the buffer, or stitched
//! from both.
//!
//! # Concurrency
//!
//! One writer, many readers. All state sits behind a single `RwLock`:
//! `read` takes the shared lock, mutations take the exclusive lock, so a
//! reader never observes a boundary that has moved past the buffer bytes
//! it is copying.

use std::path::Path;
use std::time::Instant;

use ledgerio_core::{AllocError, BackingStore, BufferAllocator, ChannelError, ChannelResult};
use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use crate::allocator::HeapAllocator;
use crate::channel::config::ChannelConfig;
use crate::store::{FileStore, SyncPolicy};

/// Cumulative channel operation counters.
///
/// These counters accumulate over the lifetime of the channel and are
/// never reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelCounters {
    /// Successful non-empty `write` calls
    pub writes: u64,
    /// Logical bytes accepted by `write`
    pub bytes_written: u64,
    /// Calls to the store's `write_append`
    pub store_appends: u64,
    /// Bytes handed to the store
    pub bytes_flushed: u64,
    /// Writes too large for the buffer, appended directly
    pub straight_through_writes: u64,
    /// Durable syncs issued
    pub syncs: u64,
    /// Total nanoseconds spent in sync calls
    pub sync_nanos: u64,
}

struct ChannelState<S> {
    /// Backing store (exclusively owned)
    store: S,

    /// Tail buffer, or the allocation failure that left the channel without one
    write_buffer: Result<Vec<u8>, AllocError>,

    /// Logical offset up to which bytes live in the store
    flushed_boundary: u64,

    /// Bytes appended to the store since the last sync
    unpersisted_bytes: u64,

    counters: ChannelCounters,
}

impl<S: BackingStore> ChannelState<S> {
    fn buffered(&self) -> &[u8] {
        match &self.write_buffer {
            Ok(buf) => buf,
            Err(_) => &[],
        }
    }

    fn logical_end(&self) -> u64 {
        self.flushed_boundary + self.buffered().len() as u64
    }

    /// Bytes accepted from writers that no sync has covered yet.
    fn unsynced_bytes(&self) -> u64 {
        self.unpersisted_bytes + self.buffered().len() as u64
    }

    /// Move the whole buffer into the store. Nothing changes on error.
    fn flush_buffer(&mut self) -> ChannelResult<()> {
        let buffer = match &mut self.write_buffer {
            Ok(buf) if !buf.is_empty() => buf,
            _ => return Ok(()),
        };

        self.store.write_append(buffer)?;

        let n = buffer.len() as u64;
        buffer.clear();
        self.flushed_boundary += n;
        self.unpersisted_bytes += n;
        self.counters.store_appends += 1;
        self.counters.bytes_flushed += n;

        trace!(bytes = n, flushed = self.flushed_boundary, "Flushed write buffer");
        Ok(())
    }

    /// Append `data` to the store without buffering it.
    fn append_through(&mut self, data: &[u8]) -> ChannelResult<()> {
        self.store.write_append(data)?;

        let n = data.len() as u64;
        self.flushed_boundary += n;
        self.unpersisted_bytes += n;
        self.counters.store_appends += 1;
        self.counters.bytes_flushed += n;
        self.counters.straight_through_writes += 1;

        debug!(bytes = n, flushed = self.flushed_boundary, "Wrote straight through");
        Ok(())
    }

    fn sync_store(&mut self) -> ChannelResult<()> {
        let start = Instant::now();
        self.store.sync()?;
        let elapsed = start.elapsed();

        self.unpersisted_bytes = 0;
        self.counters.syncs += 1;
        self.counters.sync_nanos += elapsed.as_nanos() as u64;
        Ok(())
    }

    /// Fill `dest` from the store starting at `offset`.
    fn read_store(&self, dest: &mut [u8], offset: u64) -> ChannelResult<()> {
        let mut done = 0;
        while done < dest.len() {
            match self.store.read_at(&mut dest[done..], offset + done as u64) {
                Ok(0) => {
                    return Err(ChannelError::ShortRead {
                        offset,
                        wanted: dest.len(),
                        got: done,
                    })
                }
                Ok(n) => done += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Write-back channel over a [`BackingStore`].
///
/// The channel is `Send + Sync`; share it with `Arc` to read from other
/// threads while a single writer appends.
///
/// # Example
///
/// ```ignore
/// use ledgerio_durability::{BufferedChannel, ChannelConfig, MemoryStore};
///
/// let channel = BufferedChannel::new(MemoryStore::new(), ChannelConfig::default())?;
/// channel.write(b"entry-1")?;
///
/// let mut buf = [0u8; 7];
/// channel.read(&mut buf, 0, 7)?;
/// channel.flush(true)?;
/// ```
pub struct BufferedChannel<S: BackingStore = FileStore> {
    /// `None` once closed
    state: RwLock<Option<ChannelState<S>>>,

    config: ChannelConfig,

    /// Validated `config.write_capacity`
    write_capacity: usize,
}

impl BufferedChannel<FileStore> {
    /// Open (or create) a file and wrap it in a channel.
    ///
    /// The channel starts at the file's current length.
    pub fn open<P: AsRef<Path>>(
        path: P,
        config: ChannelConfig,
        sync_policy: SyncPolicy,
    ) -> ChannelResult<Self> {
        config.validate()?;
        let store = FileStore::open(path, sync_policy)?;
        Self::new(store, config)
    }
}

impl<S: BackingStore> BufferedChannel<S> {
    /// Create a channel over `store` using heap-allocated buffers.
    pub fn new(store: S, config: ChannelConfig) -> ChannelResult<Self> {
        Self::with_allocator(store, config, &HeapAllocator)
    }

    /// Create a channel over `store`, taking the write buffer from `allocator`.
    ///
    /// A negative capacity is rejected here. An allocation failure is not:
    /// the channel opens without a buffer, still serves reads of flushed
    /// data, and reports the failure from every `write`.
    pub fn with_allocator(
        store: S,
        config: ChannelConfig,
        allocator: &dyn BufferAllocator,
    ) -> ChannelResult<Self> {
        config.validate()?;
        let write_capacity = usize::try_from(config.write_capacity)
            .map_err(|_| ChannelError::invalid("write capacity out of range"))?;

        let write_buffer = allocator.allocate(write_capacity);
        if let Err(e) = &write_buffer {
            warn!(error = %e, "Write buffer allocation failed");
        }

        let flushed_boundary = store.position();
        info!(
            position = flushed_boundary,
            write_capacity,
            unpersisted_bytes_bound = config.unpersisted_bytes_bound,
            "Opened buffered channel"
        );

        Ok(BufferedChannel {
            state: RwLock::new(Some(ChannelState {
                store,
                write_buffer,
                flushed_boundary,
                unpersisted_bytes: 0,
                counters: ChannelCounters::default(),
            })),
            config,
            write_capacity,
        })
    }

    /// Append `data` to the logical stream.
    ///
    /// If the bytes do not fit beside what is already buffered, the buffer
    /// is flushed first; data larger than the whole buffer goes straight to
    /// the store. Afterwards, when the forced-sync bound is enabled and the
    /// unsynced bytes exceed it, the buffer is flushed and the store synced
    /// before returning.
    ///
    /// A store fault while appending leaves the logical end where it was
    /// before the call, so the write can be retried. A flush made to free
    /// buffer space stays committed; it does not change the logical stream.
    ///
    /// A fault in the forced *sync* is different: the bytes are already in
    /// the store and readable, so the error means the write happened but is
    /// not yet durable. Do not retry the write; retry `flush(true)` instead.
    pub fn write(&self, data: &[u8]) -> ChannelResult<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(ChannelError::Closed)?;

        if let Err(e) = &state.write_buffer {
            return Err(ChannelError::BufferUnavailable(e.clone()));
        }
        if data.is_empty() {
            return Ok(());
        }

        if state.buffered().len() + data.len() > self.write_capacity {
            state.flush_buffer()?;
        }
        let prior = state.buffered().len();
        if data.len() > self.write_capacity {
            state.append_through(data)?;
        } else if let Ok(buf) = &mut state.write_buffer {
            buf.extend_from_slice(data);
        }

        let force_sync = self.config.forced_sync_enabled()
            && state.unsynced_bytes() > self.config.unpersisted_bytes_bound as u64;
        let unsynced = state.unsynced_bytes();
        if force_sync {
            if let Err(e) = state.flush_buffer() {
                if let Ok(buf) = &mut state.write_buffer {
                    buf.truncate(prior);
                }
                return Err(e);
            }
        }

        state.counters.writes += 1;
        state.counters.bytes_written += data.len() as u64;

        if force_sync {
            state.sync_store()?;
            debug!(
                unsynced,
                bound = self.config.unpersisted_bytes_bound,
                "Forced sync after write"
            );
        }

        Ok(())
    }

    /// Copy `length` bytes starting at logical offset `position` into `dest`.
    ///
    /// Returns the number of bytes copied, always `length` on success. A
    /// zero-length read succeeds at any non-negative position.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a negative position or length, or a position
    ///   at or beyond the logical end
    /// - `Underflow` when the range extends past the logical end
    /// - `DestinationTooSmall` when `dest` is shorter than `length`
    /// - `ShortRead` / `Io` when the store cannot serve its part
    pub fn read(&self, dest: &mut [u8], position: i64, length: i64) -> ChannelResult<usize> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(ChannelError::Closed)?;

        if position < 0 {
            return Err(ChannelError::invalid(format!(
                "negative read position {}",
                position
            )));
        }
        if length < 0 {
            return Err(ChannelError::invalid(format!(
                "negative read length {}",
                length
            )));
        }
        if length == 0 {
            return Ok(0);
        }

        let pos = position as u64;
        let logical_end = state.logical_end();
        if pos >= logical_end {
            return Err(ChannelError::invalid(format!(
                "read position {} is beyond logical end {}",
                pos, logical_end
            )));
        }
        let end = pos + length as u64;
        if end > logical_end {
            return Err(ChannelError::Underflow {
                position: pos,
                length: length as u64,
                logical_end,
            });
        }

        // Bounded by logical_end - pos, which is resident in memory or on disk.
        let len = (end - pos) as usize;
        if dest.len() < len {
            return Err(ChannelError::DestinationTooSmall {
                required: len,
                available: dest.len(),
            });
        }
        let dest = &mut dest[..len];

        let boundary = state.flushed_boundary;
        if end <= boundary {
            state.read_store(dest, pos)?;
        } else if pos >= boundary {
            let offset = (pos - boundary) as usize;
            dest.copy_from_slice(&state.buffered()[offset..offset + len]);
        } else {
            let split = (boundary - pos) as usize;
            let (from_store, from_buffer) = dest.split_at_mut(split);
            state.read_store(from_store, pos)?;
            from_buffer.copy_from_slice(&state.buffered()[..len - split]);
        }

        Ok(len)
    }

    /// Write all buffered bytes to the store, optionally syncing afterwards.
    ///
    /// Flushing an empty buffer performs no store writes.
    pub fn flush(&self, force_sync: bool) -> ChannelResult<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(ChannelError::Closed)?;

        state.flush_buffer()?;
        if force_sync {
            state.sync_store()?;
        }
        Ok(())
    }

    /// Flush and sync, returning the logical offset that is now durable.
    pub fn force_write(&self) -> ChannelResult<u64> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(ChannelError::Closed)?;

        state.flush_buffer()?;
        state.sync_store()?;
        Ok(state.flushed_boundary)
    }

    /// Flush what is buffered and release the store and buffer.
    ///
    /// The channel is closed even when the final flush fails; that failure
    /// is returned. Closing a closed channel is a no-op.
    pub fn close(&self) -> ChannelResult<()> {
        let mut guard = self.state.write();
        let Some(mut state) = guard.take() else {
            return Ok(());
        };

        let result = state.flush_buffer();
        match &result {
            Ok(()) => info!(position = state.flushed_boundary, "Closed buffered channel"),
            Err(e) => warn!(
                error = %e,
                lost = state.buffered().len(),
                "Flush on close failed"
            ),
        }
        result
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.state.read().is_none()
    }

    /// Logical end of the stream.
    pub fn position(&self) -> ChannelResult<u64> {
        self.with_state(|s| s.logical_end())
    }

    /// Logical size of the file, including buffered bytes.
    pub fn size(&self) -> ChannelResult<u64> {
        self.position()
    }

    /// Offset up to which bytes have been handed to the store.
    pub fn flushed_position(&self) -> ChannelResult<u64> {
        self.with_state(|s| s.flushed_boundary)
    }

    /// Bytes appended to the store since the last sync.
    pub fn unpersisted_bytes(&self) -> ChannelResult<u64> {
        self.with_state(|s| s.unpersisted_bytes)
    }

    /// Bytes currently resident in the write buffer.
    pub fn num_bytes_in_write_buffer(&self) -> ChannelResult<usize> {
        self.with_state(|s| s.buffered().len())
    }

    /// Snapshot of the cumulative counters.
    pub fn counters(&self) -> ChannelResult<ChannelCounters> {
        self.with_state(|s| s.counters.clone())
    }

    /// Configured write buffer capacity.
    pub fn write_capacity(&self) -> usize {
        self.write_capacity
    }

    /// Channel configuration.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    fn with_state<T>(&self, f: impl FnOnce(&ChannelState<S>) -> T) -> ChannelResult<T> {
        let guard = self.state.read();
        guard.as_ref().map(f).ok_or(ChannelError::Closed)
    }
}

impl<S: BackingStore> Drop for BufferedChannel<S> {
    fn drop(&mut self) {
        if let Some(state) = self.state.get_mut().as_mut() {
            if state.unsynced_bytes() == 0 {
                return;
            }
            if let Err(e) = state.flush_buffer().and_then(|()| state.sync_store()) {
                warn!(error = %e, "Flush on drop failed");
            }
        }
    }
}
