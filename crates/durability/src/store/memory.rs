//! In-memory store.
//!
//! Clones share the same underlying bytes, so a test can hand one clone to
//! a channel and inspect what reached the "file" through another.

use ledgerio_core::BackingStore;
use parking_lot::RwLock;
use std::io;
use std::sync::Arc;

#[derive(Debug, Default)]
struct MemoryFile {
    data: Vec<u8>,
    synced_len: u64,
}

/// Backing store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryFile>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `data`, all of it synced.
    pub fn with_contents(data: Vec<u8>) -> Self {
        let synced_len = data.len() as u64;
        MemoryStore {
            inner: Arc::new(RwLock::new(MemoryFile { data, synced_len })),
        }
    }

    /// Copy of every byte appended so far.
    pub fn contents(&self) -> Vec<u8> {
        self.inner.read().data.clone()
    }

    /// Length covered by the most recent sync.
    pub fn synced_len(&self) -> u64 {
        self.inner.read().synced_len
    }
}

impl BackingStore for MemoryStore {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let file = self.inner.read();
        let len = file.data.len() as u64;
        if offset >= len {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(file.data.len() - start);
        buf[..n].copy_from_slice(&file.data[start..start + n]);
        Ok(n)
    }

    fn write_append(&mut self, data: &[u8]) -> io::Result<()> {
        self.inner.write().data.extend_from_slice(data);
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        let mut file = self.inner.write();
        file.synced_len = file.data.len() as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.inner.read().data.len() as u64
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.position())
    }
}
