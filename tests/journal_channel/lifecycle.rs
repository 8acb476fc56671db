//! Open / close / reopen lifecycle.

use crate::common::{random_entries, TestJournal};
use ledgerio::{ChannelConfig, ChannelError};

#[test]
fn close_flushes_buffered_tail() {
    let journal = TestJournal::new();
    let channel = journal.open(ChannelConfig::new().with_write_capacity(4096));

    channel.write(b"header").unwrap();
    channel.write(b"-body").unwrap();
    assert!(journal.on_disk().is_empty());

    channel.close().unwrap();
    assert_eq!(journal.on_disk(), b"header-body");
    assert!(matches!(channel.write(b"x"), Err(ChannelError::Closed)));
}

#[test]
fn reopen_continues_the_stream() {
    let journal = TestJournal::new();
    let config = ChannelConfig::new().with_write_capacity(128);
    let entries = random_entries(3, 40, 1, 200);
    let mut expected = Vec::new();

    for batch in entries.chunks(10) {
        let channel = journal.open(config.clone());
        assert_eq!(channel.position().unwrap() as usize, expected.len());
        for entry in batch {
            channel.write(entry).unwrap();
            expected.extend_from_slice(entry);
        }
        channel.force_write().unwrap();
        channel.close().unwrap();
    }

    assert_eq!(journal.on_disk(), expected);

    let channel = journal.open(config);
    let mut buf = vec![0u8; expected.len()];
    channel.read(&mut buf, 0, expected.len() as i64).unwrap();
    assert_eq!(buf, expected);
}

#[test]
fn drop_without_close_persists_tail() {
    let journal = TestJournal::new();
    {
        let channel = journal.open(ChannelConfig::default());
        channel.write(b"left in buffer").unwrap();
    }
    assert_eq!(journal.on_disk(), b"left in buffer");
}
