//! Response body decoding.
//!
//! The target site serves a mix of UTF-8 and legacy single-byte pages without
//! reliable charset headers, so bodies are decoded by trial: UTF-8, then
//! ISO-8859-1, then Windows-1252 with replacement characters.

use encoding_rs::WINDOWS_1252;

/// Decode a response body. Never fails; the last resort is lossy.
pub fn decode_body(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    if let Some(text) = decode_latin1(bytes) {
        return text;
    }

    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}

/// ISO-8859-1 maps every byte to the code point of the same value. Bytes in
/// 0x80..=0x9F would become C1 control characters, which real pages only
/// contain when they are actually Windows-1252, so those inputs are refused.
fn decode_latin1(bytes: &[u8]) -> Option<String> {
    if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
        return None;
    }
    Some(bytes.iter().map(|&b| b as char).collect())
}
