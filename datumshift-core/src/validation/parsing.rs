//! Parsing utilities for fixed-width text fields
//!
//! NTv2 stores names as 8 byte fields padded with blanks (some producers pad
//! with NULs instead).

use crate::format::constants::LABEL_LEN;

/// Decode a fixed-width text field, dropping trailing blanks and NULs
pub fn label_text(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |p| p + 1);
    bytes[..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}

/// Encode text into a blank-padded fixed-width field, truncating if needed
pub fn pad_label(text: &str) -> [u8; LABEL_LEN] {
    let mut out = [b' '; LABEL_LEN];
    for (slot, b) in out.iter_mut().zip(text.bytes()) {
        *slot = b;
    }
    out
}

/// Compare two sub-grid names the way files reference each other
///
/// Matching ignores ASCII case and surrounding blanks.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_text() {
        assert_eq!(label_text(b"NONE    "), "NONE");
        assert_eq!(label_text(b"ALbr\0\0\0\0"), "ALbr");
        assert_eq!(label_text(b"        "), "");
        assert_eq!(label_text(b"A B     "), "A B");
    }

    #[test]
    fn test_pad_label() {
        assert_eq!(&pad_label("NONE"), b"NONE    ");
        assert_eq!(&pad_label("TOOLONGNAME"), b"TOOLONGN");
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("Qu00 ", "QU00"));
        assert!(!names_match("QU00", "QU01"));
    }
}
