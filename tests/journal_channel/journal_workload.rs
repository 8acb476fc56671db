//! Journal-style append and read-back workloads.

use crate::common::{random_entries, TestJournal};
use ledgerio::{ChannelConfig, ErrorKind};

#[test]
fn entries_read_back_at_recorded_offsets() {
    let journal = TestJournal::new();
    let channel = journal.open(ChannelConfig::new().with_write_capacity(512));

    let entries = random_entries(7, 200, 1, 300);
    let mut offsets = Vec::with_capacity(entries.len());
    for entry in &entries {
        offsets.push(channel.position().unwrap());
        channel.write(entry).unwrap();
    }

    let mut buf = vec![0u8; 300];
    for (entry, offset) in entries.iter().zip(&offsets) {
        let n = channel
            .read(&mut buf, *offset as i64, entry.len() as i64)
            .unwrap();
        assert_eq!(&buf[..n], &entry[..]);
    }

    // Entries were batched into fewer store appends
    let counters = channel.counters().unwrap();
    assert_eq!(counters.writes, 200);
    assert!(counters.store_appends < 200);
}

#[test]
fn group_commit_bounds_unsynced_bytes() {
    let journal = TestJournal::new();
    let bound = 4096;
    let channel = journal.open(
        ChannelConfig::new()
            .with_write_capacity(1024)
            .with_unpersisted_bytes_bound(bound),
    );

    for entry in random_entries(11, 100, 64, 256) {
        channel.write(&entry).unwrap();
        let unsynced = channel.position().unwrap() - synced_floor(&channel);
        assert!(unsynced <= bound as u64);
    }
    assert!(channel.counters().unwrap().syncs > 0);
}

/// Lower bound on the durable prefix: everything flushed minus what is
/// still unpersisted.
fn synced_floor(channel: &ledgerio::BufferedChannel) -> u64 {
    channel.flushed_position().unwrap() - channel.unpersisted_bytes().unwrap()
}

#[test]
fn reads_beyond_written_entries_fail() {
    let journal = TestJournal::new();
    let channel = journal.open(ChannelConfig::default());
    channel.write(b"entry-0").unwrap();

    let mut buf = [0u8; 16];
    let err = channel.read(&mut buf, 0, 8).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);

    let err = channel.read(&mut buf, 7, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert_eq!(channel.read(&mut buf, 7, 0).unwrap(), 0);
}
