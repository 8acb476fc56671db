//! Testing utilities for the durability layer
//!
//! This module provides collaborators for deterministic failure testing:
//!
//! - **Fault injection**: A store wrapper that fails chosen operations on demand
//! - **Failing allocator**: An allocator that never produces a buffer
//!
//! # Example
//!
//! ```ignore
//! use ledgerio_durability::testing::{FaultPoint, FaultyStore};
//! use ledgerio_durability::MemoryStore;
//!
//! let store = FaultyStore::new(MemoryStore::new());
//! let faults = store.handle();
//! faults.fail_at(FaultPoint::Sync);
//! ```

mod fault;

pub use fault::{FailingAllocator, FaultHandle, FaultPoint, FaultyStore};
