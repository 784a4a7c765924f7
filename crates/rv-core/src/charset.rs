//! Character encodings of input files.
//!
//! Files are named with WHATWG labels (`"UTF-8"`, `"windows-1250"`,
//! `"latin1"`, ...).  Everything downstream of the readers works on UTF-8.

use encoding_rs::Encoding;

/// The encoding for `label`, ignoring surrounding whitespace and case.
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Transcode `bytes` from `enc` to UTF-8.  Malformed sequences become
/// U+FFFD.
pub fn to_utf8(enc: &'static Encoding, bytes: Vec<u8>) -> Vec<u8> {
    if enc == encoding_rs::UTF_8 {
        return bytes;
    }
    let (text, _, _) = enc.decode(&bytes);
    text.into_owned().into_bytes()
}
