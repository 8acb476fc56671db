//! Capability traits consumed by the buffered channel
//!
//! The channel owns neither the file nor the memory it writes into. It
//! depends on these two seams so implementations can be swapped (a real
//! file, an in-memory store, a fault-injecting wrapper) without touching
//! the buffering logic.

use std::io;

use crate::error::AllocError;

/// Positioned, append-only file abstraction.
///
/// Offsets are absolute byte positions in the store. `write_append` writes
/// at the current append cursor and advances it; `position` reports that
/// cursor.
///
/// Thread safety: `read_at` is called under a shared lock from concurrent
/// readers, so implementations must be `Send + Sync`.
pub trait BackingStore: Send + Sync {
    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read; `0` means no bytes are available
    /// at `offset`.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Append all of `data` at the current cursor and advance it.
    ///
    /// On error the cursor must not advance.
    fn write_append(&mut self, data: &[u8]) -> io::Result<()>;

    /// Force previously appended bytes to stable media.
    fn sync(&mut self) -> io::Result<()>;

    /// Current append cursor.
    fn position(&self) -> u64;

    /// Current size of the underlying file.
    fn size(&self) -> io::Result<u64>;
}

impl<S: BackingStore + ?Sized> BackingStore for Box<S> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }

    fn write_append(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_append(data)
    }

    fn sync(&mut self) -> io::Result<()> {
        (**self).sync()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn size(&self) -> io::Result<u64> {
        (**self).size()
    }
}

/// Source of fixed-capacity byte buffers.
pub trait BufferAllocator: Send + Sync {
    /// Allocate an empty buffer able to hold `capacity` bytes without
    /// reallocating.
    fn allocate(&self, capacity: usize) -> Result<Vec<u8>, AllocError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullStore;

    impl BackingStore for NullStore {
        fn read_at(&self, _buf: &mut [u8], _offset: u64) -> io::Result<usize> {
            Ok(0)
        }

        fn write_append(&mut self, _data: &[u8]) -> io::Result<()> {
            Ok(())
        }

        fn sync(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn position(&self) -> u64 {
            0
        }

        fn size(&self) -> io::Result<u64> {
            Ok(0)
        }
    }

    // Test that trait is object-safe
    fn _accepts_box_dyn_store(_store: Box<dyn BackingStore>) {}

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn BackingStore> = Box::new(NullStore);
        store.write_append(b"abc").unwrap();
        store.sync().unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(store.read_at(&mut buf, 0).unwrap(), 0);
        assert_eq!(store.position(), 0);
        assert_eq!(store.size().unwrap(), 0);
    }
}
