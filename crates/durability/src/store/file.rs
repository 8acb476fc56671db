//! File-backed store.
//!
//! Reads and appends use positioned I/O so concurrent readers never race
//! the writer over a shared seek cursor. The append cursor only advances
//! after a complete write, so a failed append is retried over the same
//! byte range instead of leaving a gap.

use ledgerio_core::BackingStore;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// How `sync` forces data to stable media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// `fdatasync`: file contents only (the default)
    #[default]
    DataOnly,
    /// `fsync`: file contents and metadata
    DataAndMetadata,
}

/// Backing store over a regular file.
#[derive(Debug)]
pub struct FileStore {
    /// File handle
    file: File,

    /// Path to the file
    path: PathBuf,

    /// Append cursor (bytes from start)
    cursor: u64,

    /// Sync behavior
    sync_policy: SyncPolicy,
}

impl FileStore {
    /// Open or create a file for appending.
    ///
    /// Creates parent directories if they don't exist and positions the
    /// append cursor at the current file length.
    pub fn open<P: AsRef<Path>>(path: P, sync_policy: SyncPolicy) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;

        let cursor = file.metadata()?.len();
        info!(path = %path.display(), cursor, "Opened journal file");

        Ok(FileStore {
            file,
            path,
            cursor,
            sync_policy,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the sync policy.
    pub fn sync_policy(&self) -> SyncPolicy {
        self.sync_policy
    }
}

impl BackingStore for FileStore {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        positioned::read_at(&self.file, buf, offset)
    }

    fn write_append(&mut self, data: &[u8]) -> io::Result<()> {
        positioned::write_all_at(&self.file, data, self.cursor)?;
        self.cursor += data.len() as u64;
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        match self.sync_policy {
            SyncPolicy::DataOnly => self.file.sync_data(),
            SyncPolicy::DataAndMetadata => self.file.sync_all(),
        }
    }

    fn position(&self) -> u64 {
        self.cursor
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}

#[cfg(unix)]
mod positioned {
    use std::fs::File;
    use std::io;
    use std::os::unix::fs::FileExt;

    pub(super) fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        file.read_at(buf, offset)
    }

    pub(super) fn write_all_at(file: &File, data: &[u8], offset: u64) -> io::Result<()> {
        file.write_all_at(data, offset)
    }
}

#[cfg(windows)]
mod positioned {
    use std::fs::File;
    use std::io;
    use std::os::windows::fs::FileExt;

    pub(super) fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        file.seek_read(buf, offset)
    }

    pub(super) fn write_all_at(file: &File, mut data: &[u8], mut offset: u64) -> io::Result<()> {
        while !data.is_empty() {
            match file.seek_write(data, offset) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole buffer",
                    ))
                }
                Ok(n) => {
                    data = &data[n..];
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
