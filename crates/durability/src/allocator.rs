//! Write buffer allocation.

use ledgerio_core::{AllocError, BufferAllocator};

/// Allocates write buffers on the heap.
///
/// Allocation goes through `Vec::try_reserve_exact`, so an out-of-memory
/// condition is reported as an [`AllocError`] instead of aborting.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl BufferAllocator for HeapAllocator {
    fn allocate(&self, capacity: usize) -> Result<Vec<u8>, AllocError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(|e| AllocError::new(capacity, e.to_string()))?;
        Ok(buf)
    }
}
