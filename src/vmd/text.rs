//! Fixed-width text fields.
//!
//! Names in a motion file are stored as fixed-width, NUL-padded byte arrays in
//! a legacy 8-bit encoding (Shift-JIS in practice). The whole field is
//! transcoded first and only then cut at the first NUL in the decoded string.
//! The padding after the terminator is not always zeroed.

use encoding_rs::{Encoding, SHIFT_JIS};

/// Turns legacy-encoded bytes into a Unicode string.
pub trait TextDecoder {
    fn decode(&self, bytes: &[u8]) -> String;
}

/// Decodes with an `encoding_rs` encoding. Malformed sequences become U+FFFD.
/// A leading byte-order mark is not sniffed; it is just more field bytes.
#[derive(Copy, Clone)]
pub struct EncodingDecoder(pub &'static Encoding);

impl EncodingDecoder {
    pub fn shift_jis() -> EncodingDecoder {
        EncodingDecoder(SHIFT_JIS)
    }
}

impl Default for EncodingDecoder {
    fn default() -> EncodingDecoder {
        EncodingDecoder::shift_jis()
    }
}

impl TextDecoder for EncodingDecoder {
    fn decode(&self, bytes: &[u8]) -> String {
        let (text, had_errors) = self.0.decode_without_bom_handling(bytes);
        if had_errors {
            trace!("malformed {} in text field {:?}", self.0.name(), bytes);
        }
        text.into_owned()
    }
}

/// Decodes a whole fixed-width field, then truncates at the first NUL.
pub fn read_text_field(decoder: &dyn TextDecoder, bytes: &[u8]) -> String {
    let mut text = decoder.decode(bytes);
    if let Some(end) = text.find('\0') {
        text.truncate(end);
    }
    text
}

#[test]
fn test_truncates_at_first_nul() {
    let dec = EncodingDecoder::shift_jis();
    assert_eq!(read_text_field(&dec, b"center\0\0\0\0\0\0\0\0\0"), "center");
    assert_eq!(read_text_field(&dec, b"\0garbage"), "");
    assert_eq!(read_text_field(&dec, b"no padding"), "no padding");
}

#[test]
fn test_shift_jis() {
    let dec = EncodingDecoder::shift_jis();
    // センター (0x83 0x5A 0x83 0x93 0x83 0x5E 0x81 0x5B) + padding
    let field = [
        0x83, 0x5A, 0x83, 0x93, 0x83, 0x5E, 0x81, 0x5B,
        0x00, 0xFD, 0xFD, 0xFD, 0xFD, 0xFD, 0xFD,
    ];
    assert_eq!(read_text_field(&dec, &field), "センター");
}

#[test]
fn test_transcode_before_truncating() {
    // 0x83 0x00 is not a valid pair, so the lead byte decodes to U+FFFD and
    // the NUL survives as its own character; the name still stops there.
    let dec = EncodingDecoder::shift_jis();
    let field = [b'a', 0x83, 0x00, 0x83, 0x5A];
    assert_eq!(read_text_field(&dec, &field), "a\u{FFFD}");
}

#[test]
fn test_no_bom_sniffing() {
    let dec = EncodingDecoder::shift_jis();
    // A UTF-8 BOM would turn this into plain "ab" if it were honored.
    let s = read_text_field(&dec, &[0xEF, 0xBB, 0xBF, b'a', b'b', 0, 0]);
    assert_ne!(s, "ab");
    assert!(s.ends_with("ab"));
    // Same for a UTF-16LE BOM.
    let s = read_text_field(&dec, &[0xFF, 0xFE, b'a', 0, b'b', 0]);
    assert_eq!(s, "\u{FFFD}\u{FFFD}a");
}
