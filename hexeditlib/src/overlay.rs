//! The `overlay` module provides [`EditOverlay`], the sparse map of byte replacements
//! that have not been written to disk yet.
//!
//! An absent key means the byte equals the on-disk byte at that offset. Keys are kept in
//! a `BTreeMap`, so the pending bytes of any window can be found with a range query.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOverlay {
    pending: BTreeMap<usize, u8>,
}

impl<'a> IntoIterator for &'a EditOverlay {
    type Item = (&'a usize, &'a u8);
    type IntoIter = std::collections::btree_map::Iter<'a, usize, u8>;
    fn into_iter(self) -> Self::IntoIter {
        self.pending.iter()
    }
}

impl EditOverlay {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
        }
    }

    /// Get the pending value at the provided offset, if any.
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<u8> {
        self.pending.get(&offset).copied()
    }

    /// Set the pending value at the provided offset. Returns the previous pending value.
    pub fn insert(&mut self, offset: usize, value: u8) -> Option<u8> {
        self.pending.insert(offset, value)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, usize, u8> {
        self.into_iter()
    }

    /// Substitute pending values into `window`, which holds the on-disk bytes
    /// starting at `base`.
    pub fn apply(&self, base: usize, window: &mut [u8]) {
        if window.is_empty() {
            return;
        }
        let end = base.saturating_add(window.len());
        for (&offset, &value) in self.pending.range(base..end) {
            window[offset - base] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_substitutes_only_inside_window() {
        // Arrange
        let mut overlay = EditOverlay::new();
        overlay.insert(1, 0xAA);
        overlay.insert(4, 0xBB);
        overlay.insert(9, 0xCC); // outside of the window
        let mut window = vec![0u8; 5]; // covers offsets 2..7

        // Act
        overlay.apply(2, &mut window);

        // Assert
        assert_eq!(window, vec![0, 0, 0xBB, 0, 0]);
    }

    #[test]
    fn test_insert_returns_previous_pending_value() {
        // Arrange
        let mut overlay = EditOverlay::new();

        // Act
        let first = overlay.insert(7, 0x01);
        let second = overlay.insert(7, 0x02);

        // Assert
        assert_eq!(first, None);
        assert_eq!(second, Some(0x01));
        assert_eq!(overlay.get(7), Some(0x02));
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn test_iter_is_ordered_by_offset() {
        // Arrange
        let mut overlay = EditOverlay::new();
        for offset in [30, 10, 20] {
            overlay.insert(offset, 0);
        }

        // Act
        let offsets: Vec<usize> = overlay.iter().map(|(o, _)| *o).collect();

        // Assert
        assert_eq!(offsets, vec![10, 20, 30]);
    }
}
