//! Byte string transcoding.
//!
//! Echidna stores `bytes` and `string` values the way Haskell's `show` prints them: a quoted
//! string with printable ASCII kept as is and everything else escaped, either by name (`\NUL`,
//! `\n`, `\DEL`), with a caret (`\^A`) or numerically (`\200`, `\o310`, `\xc8`). Medusa stores
//! strings as plain UTF-8 and bytes as hex.

use alloy_primitives::hex;
use std::fmt::Write;

/// Control character mnemonics. Longer names come first so `\SOH` is never read as `\SO` + `H`.
const MNEMONICS: &[(&str, u8)] = &[
    ("NUL", 0x00),
    ("SOH", 0x01),
    ("STX", 0x02),
    ("ETX", 0x03),
    ("EOT", 0x04),
    ("ENQ", 0x05),
    ("ACK", 0x06),
    ("BEL", 0x07),
    ("DLE", 0x10),
    ("DC1", 0x11),
    ("DC2", 0x12),
    ("DC3", 0x13),
    ("DC4", 0x14),
    ("NAK", 0x15),
    ("SYN", 0x16),
    ("ETB", 0x17),
    ("CAN", 0x18),
    ("SUB", 0x1a),
    ("ESC", 0x1b),
    ("DEL", 0x7f),
    ("BS", 0x08),
    ("HT", 0x09),
    ("LF", 0x0a),
    ("VT", 0x0b),
    ("FF", 0x0c),
    ("CR", 0x0d),
    ("SO", 0x0e),
    ("SI", 0x0f),
    ("EM", 0x19),
    ("FS", 0x1c),
    ("GS", 0x1d),
    ("RS", 0x1e),
    ("US", 0x1f),
    ("SP", 0x20),
];

/// How `show` spells the control characters `0x00..=0x1f`.
const SHOW_CONTROL: [&str; 32] = [
    "NUL", "SOH", "STX", "ETX", "EOT", "ENQ", "ACK", "a", "b", "t", "n", "v", "f", "r", "SO", "SI",
    "DLE", "DC1", "DC2", "DC3", "DC4", "NAK", "SYN", "ETB", "CAN", "EM", "SUB", "ESC", "FS", "GS",
    "RS", "US",
];

/// Resolves an escaped Echidna string.
///
/// Returns the lowercase hex of the raw bytes when `want_raw_bytes` is set, otherwise one
/// `\uXXXX` escape per byte.
pub fn decode_escaped(s: &str, want_raw_bytes: bool) -> String {
    let bytes = decode_escaped_bytes(s);
    if want_raw_bytes { hex::encode(bytes) } else { unicode_escape(&bytes) }
}

/// Resolves an escaped Echidna string into its raw bytes.
///
/// One pair of surrounding quotes is stripped. A backslash that starts no known escape is dropped.
pub fn decode_escaped_bytes(s: &str) -> Vec<u8> {
    let s = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(s);
    let mut out = Vec::with_capacity(s.len());
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        if c == '\\' {
            rest = unescape(rest, &mut out);
        } else {
            push_char(&mut out, c);
        }
    }
    out
}

/// Consumes one escape sequence, the leading backslash already stripped.
fn unescape<'a>(rest: &'a str, out: &mut Vec<u8>) -> &'a str {
    if let Some((name, byte)) = MNEMONICS.iter().find(|(name, _)| rest.starts_with(name)) {
        out.push(*byte);
        return &rest[name.len()..];
    }

    let Some(c) = rest.chars().next() else { return rest };
    let after = &rest[c.len_utf8()..];
    let simple = match c {
        'a' => Some(0x07),
        'b' => Some(0x08),
        't' => Some(0x09),
        'n' => Some(0x0a),
        'v' => Some(0x0b),
        'f' => Some(0x0c),
        'r' => Some(0x0d),
        '\\' | '"' | '\'' => Some(c as u8),
        _ => None,
    };
    if let Some(byte) = simple {
        out.push(byte);
        return after;
    }

    match c {
        // the empty escape separates a numeric escape from a following digit
        '&' => after,
        '^' => match after.chars().next() {
            Some(ctl @ '@'..='_') => {
                out.push(ctl as u8 - b'@');
                &after[1..]
            }
            _ => rest,
        },
        '0'..='9' => numeric(rest, 10, out),
        'o' if after.starts_with(|c: char| c.is_digit(8)) => numeric(after, 8, out),
        'x' if after.starts_with(|c: char| c.is_ascii_hexdigit()) => numeric(after, 16, out),
        _ => rest,
    }
}

fn numeric<'a>(s: &'a str, radix: u32, out: &mut Vec<u8>) -> &'a str {
    let end = s.find(|c: char| !c.is_digit(radix)).unwrap_or(s.len());
    if let Ok(code) = u32::from_str_radix(&s[..end], radix) {
        match u8::try_from(code) {
            Ok(byte) => out.push(byte),
            Err(_) => {
                if let Some(c) = char::from_u32(code) {
                    push_char(out, c);
                }
            }
        }
    }
    &s[end..]
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Writes bytes the way Echidna stores them, quotes included.
pub fn encode_escaped(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for (i, &byte) in bytes.iter().enumerate() {
        let next = bytes.get(i + 1).copied();
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(byte as char),
            0x7f => out.push_str("\\DEL"),
            0x00..=0x1f => {
                out.push('\\');
                out.push_str(SHOW_CONTROL[byte as usize]);
                if byte == 0x0e && next == Some(b'H') {
                    out.push_str("\\&");
                }
            }
            _ => {
                let _ = write!(out, "\\{byte}");
                if next.is_some_and(|next| next.is_ascii_digit()) {
                    out.push_str("\\&");
                }
            }
        }
    }
    out.push('"');
    out
}

/// One `\uXXXX` escape per byte.
pub fn unicode_escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 6);
    for byte in bytes {
        let _ = write!(out, "\\u{byte:04x}");
    }
    out
}

/// Medusa strings are plain UTF-8.
pub fn utf8_to_hex(s: &str) -> String {
    hex::encode(s.as_bytes())
}
