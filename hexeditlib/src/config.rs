use crate::interpret::Endianness;
use crate::search::SearchScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Endianness used until the caller picks another one
    pub endianness: Endianness,
    /// Number of byte literals per row in exports
    pub bytes_per_row: usize,
    /// View of the file that searches scan
    pub search_scope: SearchScope,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endianness: Endianness::Little,
            bytes_per_row: 16,
            search_scope: SearchScope::OnDisk,
        }
    }
}
