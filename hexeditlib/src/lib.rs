//! # `hexeditlib`
//!
//! `hexeditlib` is a Rust library for editing binary files byte by byte.
//!
//! The library provides:
//! - Editing session over a file on disk (via [`Session`] struct) with pending edits kept
//!   in memory until committed.
//! - Undo/redo of single-byte edits.
//! - Byte, text, and regex search (via [`SearchType`]).
//! - Data inspector decoding integers, floats, text, and timestamps (via [`Interpretation`]).
//! - Atomic commit of pending edits back to disk.
//! - Export of the file content as an array literal (via [`ExportFormat`]).
//! - Typed [`Request`]/[`Response`] pairs for driving a session from a host.
//! - Error handling with [`HexEditError`].
//!
//! ## Example
//!
//! ```no_run
//! use hexeditlib::{Endianness, Session};
//!
//! let session = Session::open("firmware.bin").unwrap();
//! session.apply_edit(0x0, 0x5A).unwrap();
//!
//! let info = session.select_offset(0x0).unwrap();
//! assert_eq!(info.uint8, Some(0x5A));
//!
//! session.undo();
//! session.redo();
//! session.commit().unwrap();
//! ```

mod commit;
mod config;
mod error;
mod export;
mod history;
mod interpret;
mod overlay;
mod request;
mod search;
mod session;
mod source;

// Public APIs
pub use config::SessionConfig;
pub use error::{HexEditError, HexEditErrorKind};
pub use export::ExportFormat;
pub use history::{ByteChange, EditRecord};
pub use interpret::{
    Endianness, Interpretation, WINDOW_SIZE, format_float, format_with_separators, interpret,
};
pub use overlay::EditOverlay;
pub use request::{Request, Response};
pub use search::{SearchScope, SearchType, parse_hex_pattern};
pub use session::Session;
pub use source::ByteSource;
