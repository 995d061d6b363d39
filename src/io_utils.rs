//! Input resolution helpers: delimiter, encoding, and file-or-stdin readers.
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.tsv` → tab,
//!   anything else → comma) with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **stdin**: the `-` path convention reads from standard input.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use anyhow::{Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_input(path: &Path) -> io::Result<Box<dyn BufRead>> {
    if is_dash(path) {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

/// Decodes `bytes`, replacing invalid sequences with U+FFFD. The flag is
/// `true` when any replacement happened. A leading BOM is only honoured
/// when `sniff_bom` is set.
pub fn decode_lossy(bytes: &[u8], encoding: &'static Encoding, sniff_bom: bool) -> (String, bool) {
    if sniff_bom {
        let (text, _, had_errors) = encoding.decode(bytes);
        (text.into_owned(), had_errors)
    } else {
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        (text.into_owned(), had_errors)
    }
}

/// Removes a trailing `\n` or `\r\n` from a raw line buffer.
pub fn trim_line_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn delimiter_follows_extension_unless_provided() {
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.TSV"), None), b'\t');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.tsv"), Some(b';')), b';');
    }

    #[test]
    fn resolve_encoding_accepts_labels() {
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
        assert_eq!(
            resolve_encoding(Some(" latin1 ")).unwrap().name(),
            "windows-1252"
        );
        assert!(resolve_encoding(Some("klingon")).is_err());
    }

    #[test]
    fn decode_lossy_replaces_invalid_bytes() {
        assert_eq!(decode_lossy(b"Chile", UTF_8, false), ("Chile".to_string(), false));
        assert_eq!(
            decode_lossy(&[0x43, 0xff, 0x41], UTF_8, false),
            ("C\u{fffd}A".to_string(), true)
        );
    }

    #[test]
    fn decode_lossy_strips_bom_only_when_sniffing() {
        let bytes = b"\xef\xbb\xbfcountry";
        assert_eq!(decode_lossy(bytes, UTF_8, true).0, "country");
        assert_eq!(decode_lossy(bytes, UTF_8, false).0, "\u{feff}country");
    }

    #[test]
    fn trim_line_terminator_handles_crlf() {
        assert_eq!(trim_line_terminator(b"a,b\r\n"), b"a,b");
        assert_eq!(trim_line_terminator(b"a,b\n"), b"a,b");
        assert_eq!(trim_line_terminator(b"a,b"), b"a,b");
    }
}
