//! Decoding transformations.

use super::Transformation;
use crate::engine::Transaction;
use std::borrow::Cow;

/// URL decode transformation.
pub struct UrlDecode;

impl Transformation for UrlDecode {
    fn transform<'a>(&self, _tx: &Transaction, input: &'a str) -> Cow<'a, str> {
        if !input.contains('%') && !input.contains('+') {
            return Cow::Borrowed(input);
        }
        let plus_decoded = input.replace('+', " ");
        let decoded = percent_encoding::percent_decode_str(&plus_decoded).decode_utf8_lossy();
        Cow::Owned(decoded.into_owned())
    }

    fn name(&self) -> &'static str {
        "urlDecode"
    }
}

/// URL decode with `%uXXXX` Unicode escapes.
///
/// `%XX` escapes are collected as raw bytes so multi-byte UTF-8 sequences
/// decode to their characters; `%uXXXX` contributes the UTF-8 encoding of the
/// code point. Malformed escapes are kept verbatim.
pub struct UrlDecodeUni;

impl Transformation for UrlDecodeUni {
    fn transform<'a>(&self, _tx: &Transaction, input: &'a str) -> Cow<'a, str> {
        if !input.contains('%') && !input.contains('+') {
            return Cow::Borrowed(input);
        }

        let bytes = input.as_bytes();
        let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'+' => {
                    out.push(b' ');
                    i += 1;
                }
                b'%' if matches!(bytes.get(i + 1), Some(b'u') | Some(b'U')) => {
                    match bytes.get(i + 2..i + 6).and_then(parse_hex) {
                        Some(code) => {
                            let c = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
                            let mut buf = [0u8; 4];
                            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                            i += 6;
                        }
                        None => {
                            out.push(b'%');
                            i += 1;
                        }
                    }
                }
                b'%' => match bytes.get(i + 1..i + 3).and_then(parse_hex) {
                    Some(byte) => {
                        out.push(byte as u8);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                },
                b => {
                    out.push(b);
                    i += 1;
                }
            }
        }

        Cow::Owned(String::from_utf8_lossy(&out).into_owned())
    }

    fn name(&self) -> &'static str {
        "urlDecodeUni"
    }
}

fn parse_hex(digits: &[u8]) -> Option<u32> {
    if !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let s = std::str::from_utf8(digits).ok()?;
    u32::from_str_radix(s, 16).ok()
}

/// Base64 decode transformation.
pub struct Base64Decode;

impl Transformation for Base64Decode {
    fn transform<'a>(&self, _tx: &Transaction, input: &'a str) -> Cow<'a, str> {
        use base64::Engine;
        match base64::engine::general_purpose::STANDARD.decode(input) {
            Ok(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
            Err(_) => Cow::Borrowed(input),
        }
    }

    fn name(&self) -> &'static str {
        "base64Decode"
    }
}
