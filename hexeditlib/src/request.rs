//! Typed requests and responses exchanged with a host (UI, script, or another process).
//!
//! Both enums are internally tagged for serde, so a request serializes as e.g.
//! `{"op":"apply_edit","offset":16,"value":255}` and its response as
//! `{"kind":"edited","offset":16,"value":255}`.

use crate::error::{HexEditError, HexEditErrorKind};
use crate::export::ExportFormat;
use crate::interpret::{Endianness, Interpretation};
use crate::session::Session;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    GetLength,
    ReadRange {
        offset: usize,
        length: usize,
    },
    /// `value` is wider than a byte so out-of-range values can be rejected explicitly
    ApplyEdit {
        offset: usize,
        value: u64,
    },
    Commit,
    Undo,
    Redo,
    Search {
        query: String,
        #[serde(default)]
        is_hex: bool,
    },
    Export {
        #[serde(default)]
        format: ExportFormat,
    },
    SelectOffset {
        offset: usize,
    },
    SetEndianness {
        endianness: Endianness,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    Length { length: usize },
    Bytes { offset: usize, data: Vec<u8> },
    Edited { offset: usize, value: u8 },
    Committed,
    Undone { offset: usize, value: u8 },
    Redone { offset: usize, value: u8 },
    NothingToUndo,
    NothingToRedo,
    Hits { offsets: Vec<usize> },
    Exported { text: String },
    /// `result` is `None` when the endianness changed before any offset was selected
    Interpretation { result: Option<Interpretation> },
    Error { message: String },
}

impl From<HexEditError> for Response {
    fn from(err: HexEditError) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }
}

impl Session {
    /// Execute a single request against the session.
    ///
    /// # Errors
    /// Returns the error of the underlying operation, or an edit error if the
    /// requested value does not fit into a byte.
    pub fn handle(&self, request: Request) -> Result<Response, HexEditError> {
        log::debug!("Handling {request:?}");

        let response = match request {
            Request::GetLength => Response::Length { length: self.len() },
            Request::ReadRange { offset, length } => Response::Bytes {
                offset,
                data: self.read_range(offset, length)?,
            },
            Request::ApplyEdit { offset, value } => {
                let byte = u8::try_from(value)
                    .map_err(|_| HexEditError::EditError(HexEditErrorKind::InvalidValue(value)))?;
                Response::Edited {
                    offset,
                    value: self.apply_edit(offset, byte)?,
                }
            }
            Request::Commit => {
                self.commit()?;
                Response::Committed
            }
            Request::Undo => self
                .undo()
                .map_or(Response::NothingToUndo, |c| Response::Undone {
                    offset: c.offset,
                    value: c.value,
                }),
            Request::Redo => self
                .redo()
                .map_or(Response::NothingToRedo, |c| Response::Redone {
                    offset: c.offset,
                    value: c.value,
                }),
            Request::Search { query, is_hex } => Response::Hits {
                offsets: self.search(&query, is_hex),
            },
            Request::Export { format } => Response::Exported {
                text: self.export(format)?,
            },
            Request::SelectOffset { offset } => Response::Interpretation {
                result: Some(self.select_offset(offset)?),
            },
            Request::SetEndianness { endianness } => Response::Interpretation {
                result: self.set_endianness(endianness)?,
            },
        };

        Ok(response)
    }
}
