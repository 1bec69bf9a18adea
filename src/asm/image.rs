//! Program image files for the LS-8.
//!
//! An image (`.ls8`) is a simple text-based format:
//! - One byte per line, written in binary
//! - Anything after `#` is a comment
//! - Blank lines are ignored

use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// A loaded program image.
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// The program bytes, in load order.
    pub bytes: Vec<u8>,
    /// Original source lines (for debugging).
    pub source_lines: Vec<String>,
}

impl ImageFile {
    /// Create a new empty image.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            source_lines: Vec::new(),
        }
    }

    /// Add a byte.
    pub fn push(&mut self, byte: u8, source: &str) {
        self.bytes.push(byte);
        self.source_lines.push(source.to_string());
    }

    /// Get the number of bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Default for ImageFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse image text into bytes.
///
/// Each line holds one byte as binary digits; `#` starts a comment and
/// blank lines are skipped. Line numbers in errors are 1-based.
pub fn parse_image(source: &str) -> Result<ImageFile, ImageError> {
    let mut image = ImageFile::new();

    for (line_num, line) in source.lines().enumerate() {
        // Strip the comment, if any
        let code = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let code = code.trim();

        // Skip blank lines
        if code.is_empty() {
            continue;
        }

        let byte = u8::from_str_radix(code, 2).map_err(|_| ImageError::ParseError {
            line: line_num + 1,
            message: format!("expected a binary byte, found {:?}", code),
        })?;

        image.push(byte, code);
    }

    Ok(image)
}

/// Load an image file from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageFile, ImageError> {
    let source = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ImageError::IoError(e.to_string()))?;
    parse_image(&source)
}

/// Save an image file to disk.
pub fn save_image<P: AsRef<Path>>(path: P, image: &ImageFile) -> Result<(), ImageError> {
    let mut file = std::fs::File::create(path.as_ref())
        .map_err(|e| ImageError::IoError(e.to_string()))?;

    writeln!(file, "# LS-8 program image")
        .map_err(|e| ImageError::IoError(e.to_string()))?;
    writeln!(file, "# {} bytes", image.len())
        .map_err(|e| ImageError::IoError(e.to_string()))?;
    writeln!(file).map_err(|e| ImageError::IoError(e.to_string()))?;

    for (addr, byte) in image.bytes.iter().enumerate() {
        // Format: 8 binary digits # address
        writeln!(file, "{:08b} # {:02X}", byte, addr)
            .map_err(|e| ImageError::IoError(e.to_string()))?;
    }

    Ok(())
}

/// Save raw bytes directly as an image file.
pub fn save_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), ImageError> {
    let image = ImageFile {
        bytes: bytes.to_vec(),
        source_lines: bytes.iter().map(|b| format!("{:08b}", b)).collect(),
    };
    save_image(path, &image)
}

/// Errors that can occur during image operations.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytes() {
        let image = parse_image("10000010\n00000000\n00001000\n").unwrap();
        assert_eq!(image.bytes, vec![0b10000010, 0, 8]);
    }

    #[test]
    fn test_parse_comments_and_blanks() {
        let source = "\
# print8.ls8: print the number 8

10000010 # LDI R0,8
00000000
00001000
01000111 # PRN R0
00000000
00000001 # HLT
";
        let image = parse_image(source).unwrap();
        assert_eq!(
            image.bytes,
            vec![0b10000010, 0, 8, 0b01000111, 0, 0b00000001]
        );
    }

    #[test]
    fn test_parse_short_lines() {
        // Leading zeros are not required.
        let image = parse_image("1\n101\n").unwrap();
        assert_eq!(image.bytes, vec![1, 5]);
    }

    #[test]
    fn test_parse_empty_source() {
        let image = parse_image("# nothing but comments\n\n").unwrap();
        assert!(image.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_image("10000010\n00000000\nbanana\n").unwrap_err();
        match err {
            ImageError::ParseError { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("banana"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_oversized_value() {
        // Nine bits do not fit a byte.
        let err = parse_image("100000000\n").unwrap_err();
        assert!(matches!(err, ImageError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_line_numbers_count_comments() {
        let err = parse_image("# one\n# two\n2\n").unwrap_err();
        assert!(matches!(err, ImageError::ParseError { line: 3, .. }));
    }

    #[test]
    fn test_source_lines_recorded() {
        let image = parse_image("10000010 # LDI\n").unwrap();
        assert_eq!(image.source_lines, vec!["10000010"]);
    }
}
