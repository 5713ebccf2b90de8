//! The `error` module defines the [`HexEditError`] enum that describes the errors that
//! can occur when opening, reading, editing, searching, exporting, or committing a file via
//! [`Session`](crate::Session).
//! Each error carries two pieces of information:
//! 1. At which stage the error occurred, e.g., during an edit or during commit.
//! 2. What kind of error was encountered (via [`HexEditErrorKind`] enum).
//!
//! "Nothing to undo" and "nothing to redo" are not errors: undo and redo report them
//! by returning `None`.

use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexEditError {
    OpenError(HexEditErrorKind),
    ReadError(HexEditErrorKind),
    EditError(HexEditErrorKind),
    SearchError(HexEditErrorKind),
    ExportError(HexEditErrorKind),
    CommitError(HexEditErrorKind),
}

impl HexEditError {
    /// Get the underlying cause regardless of the stage.
    #[must_use]
    pub const fn kind(&self) -> &HexEditErrorKind {
        match self {
            Self::OpenError(kind)
            | Self::ReadError(kind)
            | Self::EditError(kind)
            | Self::SearchError(kind)
            | Self::ExportError(kind)
            | Self::CommitError(kind) => kind,
        }
    }
}

impl fmt::Display for HexEditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenError(base_err) => {
                write!(f, "Error encountered while opening the file:\n{base_err}")
            }
            Self::ReadError(base_err) => {
                write!(f, "Error encountered while reading bytes:\n{base_err}")
            }
            Self::EditError(base_err) => {
                write!(f, "Error encountered while editing a byte:\n{base_err}")
            }
            Self::SearchError(base_err) => {
                write!(f, "Error encountered during search:\n{base_err}")
            }
            Self::ExportError(base_err) => {
                write!(f, "Error encountered during export:\n{base_err}")
            }
            Self::CommitError(base_err) => {
                write!(
                    f,
                    "Error encountered while committing edits (file left unchanged):\n{base_err}"
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexEditErrorKind {
    /// Offset is not inside the file (offset, file length)
    OffsetOutOfRange(usize, usize),
    /// Value does not fit into a byte
    InvalidValue(u64),
    /// Search query could not be turned into a pattern
    InvalidPattern(String),
    /// Underlying read, write, or replace failed
    IoFailure(io::ErrorKind, String),
}

impl fmt::Display for HexEditErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OffsetOutOfRange(offset, length) => {
                write!(
                    f,
                    "Offset 0x{offset:X} is out of range for a file of {length} bytes"
                )
            }
            Self::InvalidValue(value) => {
                write!(f, "Value {value} does not fit into a byte (0-255)")
            }
            Self::InvalidPattern(reason) => {
                write!(f, "Invalid search pattern: {reason}")
            }
            Self::IoFailure(kind, msg) => {
                write!(f, "I/O failure ({kind}): {msg}")
            }
        }
    }
}

impl From<io::Error> for HexEditErrorKind {
    fn from(err: io::Error) -> Self {
        Self::IoFailure(err.kind(), err.to_string())
    }
}

impl Error for HexEditError {}
impl Error for HexEditErrorKind {}
