//! Integration tests for the journal channel.
//!
//! These tests drive the public facade the way a journal layer does:
//! open a file, append entry batches, read entries back at arbitrary
//! offsets, force writes at group-commit points, close and reopen.
//!
//! Unit tests in crates/durability/src/ cover the buffering logic in
//! isolation against in-memory and fault-injecting stores.

#[path = "../common/mod.rs"]
mod common;

mod journal_workload;
mod lifecycle;
