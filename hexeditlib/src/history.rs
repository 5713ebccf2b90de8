//! The `history` module keeps the linear undo/redo timeline of byte edits.
//!
//! Records move between the two stacks as a whole; recording a new edit drops the
//! redo stack, so the timeline never branches.

use serde::{Deserialize, Serialize};

/// One applied edit: the byte at `offset` went from `previous_value` to `new_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRecord {
    pub offset: usize,
    pub new_value: u8,
    pub previous_value: u8,
}

/// Effective value of a byte after an edit, undo, or redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteChange {
    pub offset: usize,
    pub value: u8,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    undo: Vec<EditRecord>,
    redo: Vec<EditRecord>,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    /// Record a freshly applied edit
    pub fn record(&mut self, record: EditRecord) {
        self.undo.push(record);
        self.redo.clear();
    }

    /// Move the latest edit to the redo stack and return it
    pub fn undo(&mut self) -> Option<EditRecord> {
        let record = self.undo.pop()?;
        self.redo.push(record);
        Some(record)
    }

    /// Move the latest undone edit back to the undo stack and return it
    pub fn redo(&mut self) -> Option<EditRecord> {
        let record = self.redo.pop()?;
        self.undo.push(record);
        Some(record)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
