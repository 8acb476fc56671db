//! Fault-injecting collaborators
//!
//! `FaultyStore` forwards every call to an inner store unless the shared
//! [`FaultHandle`] has armed a fault for that operation. Faults stay armed
//! until cleared, or fire once when armed with `fail_once_at`.

use ledgerio_core::{AllocError, BackingStore, BufferAllocator};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    /// `read_at` returns an error
    ReadAt,
    /// `read_at` returns 0 bytes, as if the file were truncated
    ShortRead,
    /// `write_append` returns an error without writing
    WriteAppend,
    /// `sync` returns an error
    Sync,
}

impl FaultPoint {
    /// Get all fault points
    pub fn all() -> Vec<FaultPoint> {
        vec![
            FaultPoint::ReadAt,
            FaultPoint::ShortRead,
            FaultPoint::WriteAppend,
            FaultPoint::Sync,
        ]
    }

    /// Get description of fault point
    pub fn description(&self) -> &'static str {
        match self {
            FaultPoint::ReadAt => "positioned read fails",
            FaultPoint::ShortRead => "positioned read returns no bytes",
            FaultPoint::WriteAppend => "append fails before writing",
            FaultPoint::Sync => "durable sync fails",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Arming {
    Always,
    Once,
}

#[derive(Debug, Default)]
struct FaultState {
    armed: HashMap<FaultPoint, Arming>,
    read_calls: u64,
    append_calls: u64,
    sync_calls: u64,
}

/// Shared control over a [`FaultyStore`].
#[derive(Debug, Clone, Default)]
pub struct FaultHandle {
    state: Arc<Mutex<FaultState>>,
}

impl FaultHandle {
    /// Fail every call at `point` until cleared.
    pub fn fail_at(&self, point: FaultPoint) {
        self.state.lock().armed.insert(point, Arming::Always);
    }

    /// Fail the next call at `point` only.
    pub fn fail_once_at(&self, point: FaultPoint) {
        self.state.lock().armed.insert(point, Arming::Once);
    }

    /// Disarm every fault.
    pub fn clear(&self) {
        self.state.lock().armed.clear();
    }

    /// Number of `read_at` calls seen, including failed ones.
    pub fn read_calls(&self) -> u64 {
        self.state.lock().read_calls
    }

    /// Number of `write_append` calls seen, including failed ones.
    pub fn append_calls(&self) -> u64 {
        self.state.lock().append_calls
    }

    /// Number of `sync` calls seen, including failed ones.
    pub fn sync_calls(&self) -> u64 {
        self.state.lock().sync_calls
    }

    /// Record a call and report whether it should fail.
    fn trip(&self, point: FaultPoint) -> bool {
        let mut state = self.state.lock();
        match point {
            FaultPoint::ReadAt | FaultPoint::ShortRead => {}
            FaultPoint::WriteAppend => state.append_calls += 1,
            FaultPoint::Sync => state.sync_calls += 1,
        }
        match state.armed.get(&point).copied() {
            Some(Arming::Always) => true,
            Some(Arming::Once) => {
                state.armed.remove(&point);
                true
            }
            None => false,
        }
    }

    fn count_read(&self) {
        self.state.lock().read_calls += 1;
    }
}

fn injected(point: FaultPoint) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("injected fault: {}", point.description()),
    )
}

/// Store wrapper that fails chosen operations on demand.
#[derive(Debug)]
pub struct FaultyStore<S> {
    inner: S,
    handle: FaultHandle,
}

impl<S: BackingStore> FaultyStore<S> {
    /// Wrap `inner` with no faults armed.
    pub fn new(inner: S) -> Self {
        FaultyStore {
            inner,
            handle: FaultHandle::default(),
        }
    }

    /// Handle for arming faults and reading call counts.
    pub fn handle(&self) -> FaultHandle {
        self.handle.clone()
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: BackingStore> BackingStore for FaultyStore<S> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.handle.count_read();
        if self.handle.trip(FaultPoint::ReadAt) {
            return Err(injected(FaultPoint::ReadAt));
        }
        if self.handle.trip(FaultPoint::ShortRead) {
            return Ok(0);
        }
        self.inner.read_at(buf, offset)
    }

    fn write_append(&mut self, data: &[u8]) -> io::Result<()> {
        if self.handle.trip(FaultPoint::WriteAppend) {
            return Err(injected(FaultPoint::WriteAppend));
        }
        self.inner.write_append(data)
    }

    fn sync(&mut self) -> io::Result<()> {
        if self.handle.trip(FaultPoint::Sync) {
            return Err(injected(FaultPoint::Sync));
        }
        self.inner.sync()
    }

    fn position(&self) -> u64 {
        self.inner.position()
    }

    fn size(&self) -> io::Result<u64> {
        self.inner.size()
    }
}

/// Allocator that never produces a buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingAllocator;

impl BufferAllocator for FailingAllocator {
    fn allocate(&self, capacity: usize) -> Result<Vec<u8>, AllocError> {
        Err(AllocError::new(capacity, "allocator has no buffers"))
    }
}
