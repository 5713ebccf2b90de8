use crate::error::HexEditErrorKind;
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchType {
    Hex(Vec<u8>),
    Ascii(String),
    Regex(String),
}

/// Which view of the file a search scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// Bytes as stored on disk, pending edits are not searched
    #[default]
    OnDisk,
    /// Bytes with pending edits applied
    Effective,
}

impl SearchType {
    /// Build the search type from a user query.
    ///
    /// # Errors
    /// Returns an error if `is_hex` is set and the query is not a sequence of
    /// two-digit hex bytes.
    pub fn from_query(query: &str, is_hex: bool) -> Result<Self, HexEditErrorKind> {
        if is_hex {
            parse_hex_pattern(query).map(Self::Hex)
        } else {
            Ok(Self::Ascii(query.to_string()))
        }
    }
}

/// Decode a hex query such as `"DE AD be ef"` into bytes. Whitespace is ignored.
///
/// # Errors
/// Returns an error on non-hex characters or an odd number of digits.
pub fn parse_hex_pattern(query: &str) -> Result<Vec<u8>, HexEditErrorKind> {
    let digits: String = query.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(HexEditErrorKind::InvalidPattern(format!(
            "'{bad}' is not a hex digit"
        )));
    }
    if !digits.len().is_multiple_of(2) {
        return Err(HexEditErrorKind::InvalidPattern(
            "hex pattern must have an even number of digits".into(),
        ));
    }

    // All chars are ASCII here, so byte slicing stays on char boundaries
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| HexEditErrorKind::InvalidPattern(e.to_string()))
        })
        .collect()
}

/// Searches for a pattern in the data.
/// Returns the starting offsets of all matches in ascending order.
///
/// # Errors
/// Returns an error if a regex pattern does not compile.
pub fn search(data: &[u8], search_type: &SearchType) -> Result<Vec<usize>, HexEditErrorKind> {
    match search_type {
        SearchType::Hex(p) => Ok(search_bytes(data, p)),
        SearchType::Ascii(s) => Ok(search_bytes(data, s.as_bytes())),
        SearchType::Regex(p) => search_regex(data, p),
    }
}

/// Slide window search. Overlapping matches are all reported.
fn search_bytes(data: &[u8], pattern: &[u8]) -> Vec<usize> {
    let size = pattern.len();
    if size == 0 {
        return vec![];
    }

    data.windows(size)
        .enumerate()
        .filter(|(_, window)| *window == pattern)
        .map(|(offset, _)| offset)
        .collect()
}

/// Regex search. Returns the start of every (non-overlapping) match.
fn search_regex(data: &[u8], pattern: &str) -> Result<Vec<usize>, HexEditErrorKind> {
    if pattern.is_empty() {
        return Ok(vec![]);
    }
    let re = Regex::new(pattern).map_err(|e| HexEditErrorKind::InvalidPattern(e.to_string()))?;

    Ok(re.find_iter(data).map(|mtch| mtch.start()).collect())
}
