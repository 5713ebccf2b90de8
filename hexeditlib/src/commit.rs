//! The `commit` module folds pending edits into the file on disk.
//!
//! The merged content is streamed into a temporary file next to the original, synced,
//! and renamed over it. Readers of the original path see either the old file or the
//! new one, never a partial write.

use crate::overlay::EditOverlay;
use crate::source::ByteSource;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Size of the chunks streamed from the source into the temporary file
const CHUNK_SIZE: usize = 64 * 1024;

/// Write the on-disk bytes with `overlay` applied to a temporary file, then atomically
/// replace the source file with it. Returns the handle of the replaced file.
///
/// # Errors
/// Returns an error if any read, write, sync, or rename fails. The original file is
/// left untouched in that case.
pub fn commit(source: &ByteSource, overlay: &EditOverlay) -> io::Result<File> {
    let path = source.path();
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory")
    })?;

    // Same directory keeps the rename on one filesystem
    let temp = tempfile::NamedTempFile::new_in(parent)?;
    let permissions = std::fs::metadata(path)?.permissions();

    {
        let mut writer = BufWriter::new(temp.as_file());
        let mut offset = 0;
        while offset < source.len() {
            let mut chunk = source.read_at(offset, CHUNK_SIZE)?;
            if chunk.is_empty() {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
            }
            overlay.apply(offset, &mut chunk);
            writer.write_all(&chunk)?;
            offset += chunk.len();
        }
        writer.flush()?;
    }

    temp.as_file().set_permissions(permissions)?;
    temp.as_file().sync_all()?;

    let file = temp.persist(path).map_err(|e| e.error)?;
    log::debug!(
        "Replaced {} with {} merged bytes",
        path.display(),
        source.len()
    );
    Ok(file)
}
