//! The `session` module provides [`Session`], a high-level API for editing one file.
//!
//! A session composes the on-disk bytes ([`ByteSource`]) with pending edits
//! ([`EditOverlay`]) and their undo/redo timeline ([`History`]). All state sits behind a
//! single mutex: every operation, including the whole of a commit, observes and leaves
//! a consistent snapshot.

use crate::commit;
use crate::config::SessionConfig;
use crate::error::{HexEditError, HexEditErrorKind};
use crate::export::ExportFormat;
use crate::history::{ByteChange, EditRecord, History};
use crate::interpret::{self, Endianness, Interpretation, WINDOW_SIZE};
use crate::overlay::EditOverlay;
use crate::search::{self, SearchScope, SearchType};
use crate::source::ByteSource;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

type Observer = Box<dyn Fn(ByteChange) + Send>;

pub struct Session {
    state: Mutex<SessionState>,
}

struct SessionState {
    /// On-disk content of the file
    source: ByteSource,
    /// Pending byte replacements
    overlay: EditOverlay,
    /// Undo/redo timeline of the pending replacements
    history: History,
    /// Anchor of the last interpretation
    selected: Option<usize>,
    /// Endianness of the last interpretation
    endianness: Endianness,
    config: SessionConfig,
    /// Notified with the effective value of every byte changed by edit/undo/redo
    observer: Option<Observer>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Session")
            .field("path", &state.source.path())
            .field("len", &state.source.len())
            .field("pending", &state.overlay.len())
            .finish_non_exhaustive()
    }
}

impl SessionState {
    fn out_of_range(&self, offset: usize) -> HexEditErrorKind {
        HexEditErrorKind::OffsetOutOfRange(offset, self.source.len())
    }

    fn notify(&self, change: ByteChange) {
        if let Some(observer) = &self.observer {
            observer(change);
        }
    }

    fn read_byte(&self, offset: usize) -> Result<u8, HexEditErrorKind> {
        if offset >= self.source.len() {
            return Err(self.out_of_range(offset));
        }
        if let Some(value) = self.overlay.get(offset) {
            return Ok(value);
        }
        let bytes = self.source.read_at(offset, 1)?;
        bytes.first().copied().ok_or_else(|| self.out_of_range(offset))
    }

    fn read_range(&self, offset: usize, length: usize) -> Result<Vec<u8>, HexEditErrorKind> {
        let mut window = self.source.read_at(offset, length)?;
        self.overlay.apply(offset, &mut window);
        Ok(window)
    }

    fn apply_edit(&mut self, offset: usize, value: u8) -> Result<u8, HexEditErrorKind> {
        let previous_value = self.read_byte(offset)?;

        self.overlay.insert(offset, value);
        self.history.record(EditRecord {
            offset,
            new_value: value,
            previous_value,
        });
        log::debug!("Edit at 0x{offset:X}: 0x{previous_value:02X} -> 0x{value:02X}");

        self.notify(ByteChange { offset, value });
        Ok(value)
    }

    fn undo(&mut self) -> Option<ByteChange> {
        let record = self.history.undo()?;
        self.overlay.insert(record.offset, record.previous_value);

        let change = ByteChange {
            offset: record.offset,
            value: record.previous_value,
        };
        self.notify(change);
        Some(change)
    }

    fn redo(&mut self) -> Option<ByteChange> {
        let record = self.history.redo()?;
        self.overlay.insert(record.offset, record.new_value);

        let change = ByteChange {
            offset: record.offset,
            value: record.new_value,
        };
        self.notify(change);
        Some(change)
    }

    fn commit(&mut self) -> Result<(), HexEditErrorKind> {
        if self.overlay.is_empty() {
            self.history.clear();
            return Ok(());
        }

        let file = commit::commit(&self.source, &self.overlay)?;

        // Nothing below can fail: the file is already replaced
        let written = self.overlay.len();
        self.source.replace_handle(file);
        self.overlay.clear();
        self.history.clear();
        log::info!(
            "Committed {written} pending byte(s) to {}",
            self.source.path().display()
        );
        Ok(())
    }

    fn search(&self, search_type: &SearchType) -> Result<Vec<usize>, HexEditErrorKind> {
        let data = match self.config.search_scope {
            SearchScope::OnDisk => self.source.read_all()?,
            SearchScope::Effective => self.read_range(0, self.source.len())?,
        };
        search::search(&data, search_type)
    }

    fn interpret(&self, offset: usize) -> Result<Interpretation, HexEditErrorKind> {
        if offset >= self.source.len() {
            return Err(self.out_of_range(offset));
        }
        let window = self.read_range(offset, WINDOW_SIZE)?;
        Ok(interpret::interpret(&window, offset, self.endianness))
    }
}

impl Session {
    /// Opens the file at the provided path with the default configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    ///
    /// # Example
    /// ```no_run
    /// use hexeditlib::Session;
    ///
    /// let session = Session::open("firmware.bin").unwrap();
    /// session.apply_edit(0x10, 0xFF).unwrap();
    /// session.commit().unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HexEditError> {
        Self::open_with(path, SessionConfig::default())
    }

    /// Opens the file at the provided path with the provided configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open_with<P: AsRef<Path>>(path: P, config: SessionConfig) -> Result<Self, HexEditError> {
        let source = ByteSource::open(path)
            .map_err(|e| HexEditError::OpenError(HexEditErrorKind::from(e)))?;
        log::info!(
            "Opened {} ({} bytes)",
            source.path().display(),
            source.len()
        );

        Ok(Self {
            state: Mutex::new(SessionState {
                source,
                overlay: EditOverlay::new(),
                history: History::new(),
                selected: None,
                endianness: config.endianness,
                config,
                observer: None,
            }),
        })
    }

    /// Register a callback notified with the new effective value of every byte
    /// changed by an edit, undo, or redo. Replaces any previous observer.
    ///
    /// The callback runs while the session is locked and must not call back into it.
    pub fn set_observer<F>(&self, observer: F)
    where
        F: Fn(ByteChange) + Send + 'static,
    {
        self.state.lock().observer = Some(Box::new(observer));
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.state.lock().source.path().to_path_buf()
    }

    /// File size in bytes, fixed for the lifetime of the session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().source.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.state.lock().config
    }

    /// Get the effective byte (pending edit or on-disk value) at the provided offset.
    ///
    /// # Errors
    /// Returns an error if the offset is out of range or the file cannot be read.
    pub fn read_byte(&self, offset: usize) -> Result<u8, HexEditError> {
        self.state
            .lock()
            .read_byte(offset)
            .map_err(HexEditError::ReadError)
    }

    /// Get up to `length` effective bytes starting at `offset`.
    /// The window is clamped to the end of the file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn read_range(&self, offset: usize, length: usize) -> Result<Vec<u8>, HexEditError> {
        self.state
            .lock()
            .read_range(offset, length)
            .map_err(HexEditError::ReadError)
    }

    /// Replace the byte at the provided offset with a pending value.
    /// Returns the new effective value. Clears the redo history.
    ///
    /// # Errors
    /// Returns an error if the offset is out of range or the previous value cannot be
    /// read; nothing is changed in that case.
    pub fn apply_edit(&self, offset: usize, value: u8) -> Result<u8, HexEditError> {
        self.state
            .lock()
            .apply_edit(offset, value)
            .map_err(HexEditError::EditError)
    }

    /// Revert the latest edit. Returns `None` if there is nothing to undo.
    pub fn undo(&self) -> Option<ByteChange> {
        self.state.lock().undo()
    }

    /// Re-apply the latest undone edit. Returns `None` if there is nothing to redo.
    pub fn redo(&self) -> Option<ByteChange> {
        self.state.lock().redo()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.state.lock().history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.state.lock().history.can_redo()
    }

    /// Are there edits not yet written to disk
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.state.lock().overlay.is_empty()
    }

    /// Pending `(offset, value)` pairs in ascending offset order.
    #[must_use]
    pub fn pending_edits(&self) -> Vec<(usize, u8)> {
        self.state
            .lock()
            .overlay
            .iter()
            .map(|(&offset, &value)| (offset, value))
            .collect()
    }

    /// Drop all pending edits and the undo/redo history without touching the file.
    pub fn discard(&self) {
        let mut state = self.state.lock();
        state.overlay.clear();
        state.history.clear();
        log::debug!("Discarded pending edits of {}", state.source.path().display());
    }

    /// Write all pending edits to the file atomically and clear the history.
    ///
    /// # Errors
    /// Returns an error if writing or replacing the file fails. The file, the pending
    /// edits, and the history are left unchanged, so the commit can be retried.
    pub fn commit(&self) -> Result<(), HexEditError> {
        self.state
            .lock()
            .commit()
            .map_err(HexEditError::CommitError)
    }

    /// Search for a byte or text query. An invalid hex query gives no hits.
    #[must_use]
    pub fn search(&self, query: &str, is_hex: bool) -> Vec<usize> {
        let res = SearchType::from_query(query, is_hex)
            .map_err(HexEditError::SearchError)
            .and_then(|search_type| self.search_with(&search_type));

        res.unwrap_or_else(|err| {
            log::warn!("{err}");
            Vec::new()
        })
    }

    /// Search with an explicit search type.
    ///
    /// # Errors
    /// Returns an error if the regex does not compile or the file cannot be read.
    pub fn search_with(&self, search_type: &SearchType) -> Result<Vec<usize>, HexEditError> {
        self.state
            .lock()
            .search(search_type)
            .map_err(HexEditError::SearchError)
    }

    /// Select the provided offset and interpret the window starting there.
    ///
    /// # Errors
    /// Returns an error if the offset is out of range or the file cannot be read;
    /// the previous selection is kept in that case.
    pub fn select_offset(&self, offset: usize) -> Result<Interpretation, HexEditError> {
        let mut state = self.state.lock();
        let res = state.interpret(offset).map_err(HexEditError::ReadError)?;
        state.selected = Some(offset);
        Ok(res)
    }

    /// Switch the endianness and re-interpret the selected offset, if any.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn set_endianness(
        &self,
        endianness: Endianness,
    ) -> Result<Option<Interpretation>, HexEditError> {
        let mut state = self.state.lock();
        state.endianness = endianness;
        state
            .selected
            .map(|offset| state.interpret(offset))
            .transpose()
            .map_err(HexEditError::ReadError)
    }

    #[must_use]
    pub fn selected_offset(&self) -> Option<usize> {
        self.state.lock().selected
    }

    #[must_use]
    pub fn endianness(&self) -> Endianness {
        self.state.lock().endianness
    }

    /// Render the whole file, pending edits included, as an array literal.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn export(&self, format: ExportFormat) -> Result<String, HexEditError> {
        let state = self.state.lock();
        let data = state
            .read_range(0, state.source.len())
            .map_err(HexEditError::ExportError)?;
        Ok(format.render(&data, state.config.bytes_per_row))
    }
}
