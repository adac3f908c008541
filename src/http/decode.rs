//! Byte-to-text decoding for request and response chunks.

use std::fmt::Write;

/// Decode `bytes` as UTF-8, rendering every invalid byte as a `\xNN` escape.
///
/// Unlike [`String::from_utf8_lossy`] no information is lost: the escaped
/// bytes remain visible in logs and records.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());

                let invalid = err.error_len().unwrap_or(after.len());
                for byte in &after[..invalid] {
                    let _ = write!(out, "\\x{:02x}", byte);
                }
                rest = &after[invalid..];
            }
        }
    }
}
