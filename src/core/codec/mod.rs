//! Display formatting for binary data
//!
//! Responses are opaque bytes; this module renders them for humans and
//! scripts (hex strings, xxd-style dumps).

use serde::{Deserialize, Serialize};

/// Hex display format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HexFormat {
    /// Lowercase, no separators (e.g., "48656c6c6f")
    #[default]
    Lower,
    /// Uppercase, no separators (e.g., "48656C6C6F")
    Upper,
    /// Uppercase, space-separated (e.g., "48 65 6C 6C 6F")
    Spaced,
}

/// Render bytes as a hex string in the given format
pub fn format_bytes(data: &[u8], format: HexFormat) -> String {
    match format {
        HexFormat::Lower => hex::encode(data),
        HexFormat::Upper => hex::encode_upper(data),
        HexFormat::Spaced => data
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Format bytes as a hexdump (like xxd)
pub fn hexdump(data: &[u8], bytes_per_line: usize) -> String {
    let mut output = String::new();

    for (offset, chunk) in data.chunks(bytes_per_line).enumerate() {
        output.push_str(&format!("{:08x}  ", offset * bytes_per_line));

        for (i, byte) in chunk.iter().enumerate() {
            output.push_str(&format!("{byte:02x} "));
            if i == bytes_per_line / 2 - 1 {
                output.push(' ');
            }
        }

        // Padding for incomplete lines
        if chunk.len() < bytes_per_line {
            let missing = bytes_per_line - chunk.len();
            for i in 0..missing {
                output.push_str("   ");
                if chunk.len() + i == bytes_per_line / 2 - 1 {
                    output.push(' ');
                }
            }
        }

        output.push(' ');

        output.push('|');
        for byte in chunk {
            if byte.is_ascii_graphic() || *byte == b' ' {
                output.push(*byte as char);
            } else {
                output.push('.');
            }
        }
        for _ in chunk.len()..bytes_per_line {
            output.push(' ');
        }
        output.push('|');
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        let data = b"\x01\xab\xff";
        assert_eq!(format_bytes(data, HexFormat::Lower), "01abff");
        assert_eq!(format_bytes(data, HexFormat::Upper), "01ABFF");
        assert_eq!(format_bytes(data, HexFormat::Spaced), "01 AB FF");
    }

    #[test]
    fn test_hexdump() {
        let data = b"Hello, World!";
        let dump = hexdump(data, 16);
        assert!(dump.contains("48 65 6c 6c 6f"));
        assert!(dump.contains("|Hello, World!"));
    }
}
