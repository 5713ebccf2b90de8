//! The `interpret` module decodes a window of up to [`WINDOW_SIZE`] bytes into
//! fixed-width integers, floats, text renderings, and a Unix timestamp.
//!
//! Numeric fields are `None` whenever the window is shorter than the field's width.
//! Text renderings always cover the whole window, with `.` standing in for bytes that
//! cannot be shown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of bytes decoded per interpretation
pub const WINDOW_SIZE: usize = 8;

const PLACEHOLDER: char = '.';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    /// Offset of the first byte of the window
    pub offset: usize,
    /// Byte order used for multi-byte fields
    pub endianness: Endianness,
    /// Raw window, in file order
    pub bytes: Vec<u8>,
    pub uint8: Option<u8>,
    pub int8: Option<i8>,
    pub uint16: Option<u16>,
    pub int16: Option<i16>,
    pub uint32: Option<u32>,
    pub int32: Option<i32>,
    pub uint64: Option<u64>,
    pub int64: Option<i64>,
    #[serde(default, with = "float_repr")]
    pub float32: Option<f32>,
    #[serde(default, with = "float_repr")]
    pub float64: Option<f64>,
    /// Bit pattern of the widest unsigned field available
    pub binary: Option<String>,
    pub ascii: String,
    pub utf8: String,
    pub utf16le: String,
    /// First four bytes read as little-endian seconds since the Unix epoch
    pub unix_time: Option<DateTime<Utc>>,
}

/// Floats travel as JSON numbers, except NaN and infinities which become the strings
/// `"NaN"`, `"inf"` and `"-inf"`. `null` stays reserved for a window too short for the field.
mod float_repr {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub trait Float: Copy + Serialize + Into<f64> {
        fn from_f64(value: f64) -> Self;
    }

    impl Float for f32 {
        #[allow(clippy::cast_possible_truncation)]
        fn from_f64(value: f64) -> Self {
            value as Self
        }
    }

    impl Float for f64 {
        fn from_f64(value: f64) -> Self {
            value
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<T: Float, S: Serializer>(
        value: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let Some(value) = *value else {
            return serializer.serialize_none();
        };

        let f: f64 = value.into();
        if f.is_nan() {
            serializer.serialize_some("NaN")
        } else if f == f64::INFINITY {
            serializer.serialize_some("inf")
        } else if f == f64::NEG_INFINITY {
            serializer.serialize_some("-inf")
        } else {
            serializer.serialize_some(&value)
        }
    }

    pub fn deserialize<'de, T: Float, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<T>, D::Error> {
        let value = match Option::<Repr>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(Repr::Number(n)) => n,
            Some(Repr::Text(text)) => match text.as_str() {
                "NaN" => f64::NAN,
                "inf" => f64::INFINITY,
                "-inf" => f64::NEG_INFINITY,
                other => return Err(D::Error::custom(format!("invalid float '{other}'"))),
            },
        };
        Ok(Some(T::from_f64(value)))
    }
}

/// Take the first `N` bytes of the window, arranged little-endian first.
fn take<const N: usize>(bytes: &[u8], endianness: Endianness) -> Option<[u8; N]> {
    let mut arr: [u8; N] = bytes.get(..N)?.try_into().ok()?;
    if endianness == Endianness::Big {
        arr.reverse();
    }
    Some(arr)
}

/// Noncharacters and invisible format characters, on top of the control characters
const fn is_hidden(c: char) -> bool {
    let cp = c as u32;
    (cp & 0xFFFE) == 0xFFFE
        || matches!(
            cp,
            0x00AD
                | 0x0600..=0x0605
                | 0x061C
                | 0x06DD
                | 0x070F
                | 0x180E
                | 0x200B..=0x200F
                | 0x2028..=0x202E
                | 0x2060..=0x2064
                | 0x2066..=0x206F
                | 0xFDD0..=0xFDEF
                | 0xFEFF
                | 0xFFF9..=0xFFFB
                | 0xE0001
                | 0xE0020..=0xE007F
        )
}

fn printable(c: char) -> char {
    if c.is_control() || is_hidden(c) {
        PLACEHOLDER
    } else {
        c
    }
}

fn render_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if (0x20..=0x7E).contains(&b) {
                char::from(b)
            } else {
                PLACEHOLDER
            }
        })
        .collect()
}

fn render_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.extend(chunk.valid().chars().map(printable));
        if !chunk.invalid().is_empty() {
            out.push(PLACEHOLDER);
        }
    }
    out
}

fn render_utf16le(bytes: &[u8]) -> String {
    let pairs = bytes.chunks_exact(2);
    let odd_tail = !pairs.remainder().is_empty();

    let units = pairs.map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    let mut out: String = char::decode_utf16(units)
        .map(|res| res.map_or(PLACEHOLDER, printable))
        .collect();

    if odd_tail {
        out.push(PLACEHOLDER);
    }
    out
}

fn render_binary(bytes: &[u8], endianness: Endianness) -> Option<String> {
    match bytes.len() {
        0 => None,
        1 => Some(format!("{:08b}", bytes[0])),
        2..=3 => take::<2>(bytes, endianness).map(|a| format!("{:016b}", u16::from_le_bytes(a))),
        4..=7 => take::<4>(bytes, endianness).map(|a| format!("{:032b}", u32::from_le_bytes(a))),
        _ => take::<8>(bytes, endianness).map(|a| format!("{:064b}", u64::from_le_bytes(a))),
    }
}

/// Decode the window starting at `offset`. Bytes beyond [`WINDOW_SIZE`] are ignored.
#[must_use]
pub fn interpret(window: &[u8], offset: usize, endianness: Endianness) -> Interpretation {
    let bytes = &window[..window.len().min(WINDOW_SIZE)];

    Interpretation {
        offset,
        endianness,
        bytes: bytes.to_vec(),
        uint8: bytes.first().copied(),
        int8: bytes.first().map(|&b| i8::from_le_bytes([b])),
        uint16: take(bytes, endianness).map(u16::from_le_bytes),
        int16: take(bytes, endianness).map(i16::from_le_bytes),
        uint32: take(bytes, endianness).map(u32::from_le_bytes),
        int32: take(bytes, endianness).map(i32::from_le_bytes),
        uint64: take(bytes, endianness).map(u64::from_le_bytes),
        int64: take(bytes, endianness).map(i64::from_le_bytes),
        float32: take(bytes, endianness).map(f32::from_le_bytes),
        float64: take(bytes, endianness).map(f64::from_le_bytes),
        binary: render_binary(bytes, endianness),
        ascii: render_ascii(bytes),
        utf8: render_utf8(bytes),
        utf16le: render_utf16le(bytes),
        unix_time: take(bytes, Endianness::Little)
            .map(u32::from_le_bytes)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(i64::from(secs), 0)),
    }
}

#[allow(clippy::needless_pass_by_value)]
/// Format the number so that it has separators (for readability)
pub fn format_with_separators<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let mut result = String::new();

    // Consider negative sign in front of digits
    let (sign, digits) = s
        .strip_prefix('-')
        .map_or(("", s.as_str()), |stripped| ("-", stripped));

    for (idx, ch) in digits.chars().rev().enumerate() {
        if idx != 0 && idx % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, ch);
    }
    format!("{sign}{result}")
}

/// Format the float so that it is nicely presented
pub fn format_float<T: Into<f64>>(float_value: T) -> String {
    let f = float_value.into();
    if !f.is_finite() {
        return f.to_string();
    }

    // Very large or very small values use scientific notation
    if f.abs() >= 1e6 || (f != 0.0 && f.abs() < 1e-5) {
        return format!("{f:e}");
    }
    let formatted = format!("{f:.17}");

    // Trim trailing zeros and possible trailing decimal point
    let trimmed = formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string();

    // Split into integer + fractional parts
    let mut parts = trimmed.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next().unwrap_or("");

    if frac_part.is_empty() {
        return format_with_separators(int_part);
    }
    format!("{}.{}", format_with_separators(int_part), frac_part)
}

impl Interpretation {
    /// Label/value pairs for a two-column inspector table.
    /// Fields not available for this window show as `--`.
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        fn show<T>(value: Option<T>, f: impl Fn(T) -> String) -> String {
            value.map_or_else(|| "--".to_string(), f)
        }

        vec![
            ("u8", show(self.uint8, format_with_separators)),
            ("i8", show(self.int8, format_with_separators)),
            ("u16", show(self.uint16, format_with_separators)),
            ("i16", show(self.int16, format_with_separators)),
            ("u32", show(self.uint32, format_with_separators)),
            ("i32", show(self.int32, format_with_separators)),
            ("u64", show(self.uint64, format_with_separators)),
            ("i64", show(self.int64, format_with_separators)),
            ("f32", show(self.float32, format_float)),
            ("f64", show(self.float64, format_float)),
            ("bin", show(self.binary.clone(), |b| b)),
            ("ascii", self.ascii.clone()),
            ("utf-8", self.utf8.clone()),
            ("utf-16le", self.utf16le.clone()),
            (
                "unix time",
                show(self.unix_time, |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            ),
        ]
    }
}
