//! Shared test utilities for integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use ledgerio::{BufferedChannel, ChannelConfig, SyncPolicy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::Once;
use tempfile::TempDir;

static INIT_TRACING: Once = Once::new();

/// Install a test subscriber once per process. Honors `RUST_LOG`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    });
}

/// A journal file in its own temporary directory.
pub struct TestJournal {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TestJournal {
    /// Create a fresh, not yet existing, journal path.
    pub fn new() -> Self {
        init_tracing();
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("journal").join("current.txn");
        TestJournal { dir, path }
    }

    /// Open a channel on the journal file.
    pub fn open(&self, config: ChannelConfig) -> BufferedChannel {
        BufferedChannel::open(&self.path, config, SyncPolicy::DataOnly).expect("open channel")
    }

    /// Bytes currently on disk.
    pub fn on_disk(&self) -> Vec<u8> {
        std::fs::read(&self.path).unwrap_or_default()
    }
}

/// Deterministic random entry payloads with sizes in `min..max`.
pub fn random_entries(seed: u64, count: usize, min: usize, max: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(min..max);
            (0..len).map(|_| rng.gen::<u8>()).collect()
        })
        .collect()
}
