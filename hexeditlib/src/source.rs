//! The `source` module provides [`ByteSource`], read-only random access to the bytes of
//! a file as they are currently stored on disk.
//!
//! The length is captured when the file is opened and stays fixed for the lifetime of the
//! source: edits replace bytes in place and never grow or shrink the file.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ByteSource {
    /// Absolute path of the opened file
    path: PathBuf,
    /// Handle used for all reads
    file: File,
    /// File size in bytes, captured at open time
    len: usize,
}

impl ByteSource {
    /// Opens the file at the provided path for reading.
    ///
    /// # Errors
    /// Returns an error if the path does not exist, is not a regular file, or cannot be read.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = std::fs::canonicalize(path)?;
        let file = File::open(&path)?;

        let meta = file.metadata()?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path is not a file: {}", path.display()),
            ));
        }

        let len = usize::try_from(meta.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::FileTooLarge,
                format!("File does not fit into memory space: {}", path.display()),
            )
        })?;

        Ok(Self { path, file, len })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads up to `length` bytes starting at `offset`.
    /// The result is clamped to the end of the file; an offset past the end yields
    /// an empty vector.
    ///
    /// # Errors
    /// Returns an error if seeking or reading the underlying file fails.
    pub fn read_at(&self, offset: usize, length: usize) -> io::Result<Vec<u8>> {
        let available = self.len.saturating_sub(offset);
        let count = length.min(available);
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut buf = vec![0u8; count];
        let mut handle = &self.file;
        handle.seek(SeekFrom::Start(offset as u64))?;
        handle.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads the whole file content.
    ///
    /// # Errors
    /// Returns an error if reading the underlying file fails.
    pub fn read_all(&self) -> io::Result<Vec<u8>> {
        self.read_at(0, self.len)
    }

    /// Swap the handle for the one of a freshly committed file at the same path.
    pub(crate) fn replace_handle(&mut self, file: File) {
        self.file = file;
    }
}
