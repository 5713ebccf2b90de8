use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target syntax of an exported byte array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Space-separated hex digits, one row per line
    #[default]
    Plain,
    C,
    Rust,
    Python,
    JavaScript,
    Go,
    CSharp,
}

impl ExportFormat {
    pub const ALL: [Self; 7] = [
        Self::Plain,
        Self::C,
        Self::Rust,
        Self::Python,
        Self::JavaScript,
        Self::Go,
        Self::CSharp,
    ];

    /// Opening and closing text around the array body
    fn frame(self, len: usize) -> (String, &'static str) {
        match self {
            Self::Plain => (String::new(), ""),
            Self::C => (format!("unsigned char data[{len}] = {{\n"), "};"),
            Self::Rust => (format!("pub const DATA: [u8; {len}] = [\n"), "];"),
            Self::Python => ("data = bytes([\n".to_string(), "])"),
            Self::JavaScript => ("const data = new Uint8Array([\n".to_string(), "]);"),
            Self::Go => ("var data = []byte{\n".to_string(), "}"),
            Self::CSharp => ("byte[] data = {\n".to_string(), "};"),
        }
    }

    /// Render `data` as an array literal, `bytes_per_row` literals per line.
    #[must_use]
    pub fn render(self, data: &[u8], bytes_per_row: usize) -> String {
        let bytes_per_row = bytes_per_row.max(1);

        if self == Self::Plain {
            return data
                .chunks(bytes_per_row)
                .map(|row| {
                    row.iter()
                        .map(|b| format!("{b:02X}"))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
                .join("\n");
        }

        let (open, close) = self.frame(data.len());
        let mut out = open;
        for row in data.chunks(bytes_per_row) {
            let literals: Vec<String> = row.iter().map(|b| format!("0x{b:02X}")).collect();
            // Trailing comma on every row is valid in all target languages
            out.push_str("    ");
            out.push_str(&literals.join(", "));
            out.push_str(",\n");
        }
        out.push_str(close);
        out
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Plain => "plain",
            Self::C => "c",
            Self::Rust => "rust",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Go => "go",
            Self::CSharp => "csharp",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "hex" => Ok(Self::Plain),
            "c" | "cpp" | "c++" => Ok(Self::C),
            "rust" | "rs" => Ok(Self::Rust),
            "python" | "py" => Ok(Self::Python),
            "javascript" | "js" => Ok(Self::JavaScript),
            "go" => Ok(Self::Go),
            "csharp" | "cs" | "c#" => Ok(Self::CSharp),
            other => Err(format!("Unknown export format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_wraps_rows() {
        // Arrange
        let data: Vec<u8> = (0..5).collect();

        // Act
        let text = ExportFormat::Plain.render(&data, 2);

        // Assert
        assert_eq!(text, "00 01\n02 03\n04");
    }

    #[test]
    fn test_render_c() {
        // Act
        let text = ExportFormat::C.render(b"AB\xff", 16);

        // Assert
        assert_eq!(text, "unsigned char data[3] = {\n    0x41, 0x42, 0xFF,\n};");
    }

    #[test]
    fn test_render_go_rows_end_with_comma() {
        // Act
        let text = ExportFormat::Go.render(&[1, 2, 3], 2);

        // Assert
        assert_eq!(text, "var data = []byte{\n    0x01, 0x02,\n    0x03,\n}");
    }

    #[test]
    fn test_render_empty_data() {
        // Act
        let plain = ExportFormat::Plain.render(&[], 16);
        let rust = ExportFormat::Rust.render(&[], 16);

        // Assert
        assert_eq!(plain, "");
        assert_eq!(rust, "pub const DATA: [u8; 0] = [\n];");
    }

    #[test]
    fn test_from_str_round_trips_display() {
        for format in ExportFormat::ALL {
            assert_eq!(format.to_string().parse::<ExportFormat>(), Ok(format));
        }
        assert_eq!("C#".parse::<ExportFormat>(), Ok(ExportFormat::CSharp));
        assert!("cobol".parse::<ExportFormat>().is_err());
    }
}
