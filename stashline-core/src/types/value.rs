//! Values accepted by the instrumented store.

use serde::{Deserialize, Serialize};

/// A value that can be stored under a generated key.
///
/// The store keeps raw bytes; [`StoredValue::to_bytes`] defines how each
/// variant is laid out so that `get_str`, `get_int` and `get_float` can read
/// it back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StoredValue {
    /// UTF-8 text.
    Text(String),
    /// Opaque bytes, stored as-is.
    Bytes(Vec<u8>),
    /// Signed integer, stored as decimal text.
    Integer(i64),
    /// Floating-point number, stored as decimal text.
    Float(f64),
}

impl StoredValue {
    /// Encodes the value the way it is written to the store.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            StoredValue::Text(s) => s.as_bytes().to_vec(),
            StoredValue::Bytes(b) => b.clone(),
            StoredValue::Integer(i) => i.to_string().into_bytes(),
            StoredValue::Float(f) => format_float(*f).into_bytes(),
        }
    }

    /// Literal representation used in call history (`'cat'`, `b'\x00'`, `42`, `3.5`).
    pub fn repr(&self) -> String {
        match self {
            StoredValue::Text(s) => text_repr(s),
            StoredValue::Bytes(b) => bytes_repr(b),
            StoredValue::Integer(i) => i.to_string(),
            StoredValue::Float(f) => format_float(*f),
        }
    }

    /// Representation of a single-argument call, e.g. `('cat',)`.
    pub fn args_repr(&self) -> String {
        format!("({},)", self.repr())
    }
}

/// Shortest decimal text that parses back to `f`, always marked as a float.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".into()
    } else if f.is_infinite() {
        if f > 0.0 { "inf".into() } else { "-inf".into() }
    } else {
        let text = format!("{:?}", f);
        match text.split_once('e') {
            // Exponents carry a sign and at least two digits: 1e+20, 1e-07.
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => text,
        }
    }
}

fn text_repr(s: &str) -> String {
    // Prefer single quotes; switch only when that avoids escaping.
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() || matches!(c, '\u{2028}' | '\u{2029}') => {
                out.push_str(&escape_char(c));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn escape_char(c: char) -> String {
    match c as u32 {
        n @ 0..=0xff => format!("\\x{:02x}", n),
        n @ 0x100..=0xffff => format!("\\u{:04x}", n),
        n => format!("\\U{:08x}", n),
    }
}

fn bytes_repr(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') { b'"' } else { b'\'' };
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote as char);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            b => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push(quote as char);
    out
}

impl From<String> for StoredValue {
    fn from(s: String) -> Self {
        StoredValue::Text(s)
    }
}

impl From<&str> for StoredValue {
    fn from(s: &str) -> Self {
        StoredValue::Text(s.to_string())
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(b: Vec<u8>) -> Self {
        StoredValue::Bytes(b)
    }
}

impl From<&[u8]> for StoredValue {
    fn from(b: &[u8]) -> Self {
        StoredValue::Bytes(b.to_vec())
    }
}

impl From<i64> for StoredValue {
    fn from(i: i64) -> Self {
        StoredValue::Integer(i)
    }
}

impl From<i32> for StoredValue {
    fn from(i: i32) -> Self {
        StoredValue::Integer(i64::from(i))
    }
}

impl From<u32> for StoredValue {
    fn from(i: u32) -> Self {
        StoredValue::Integer(i64::from(i))
    }
}

impl From<f64> for StoredValue {
    fn from(f: f64) -> Self {
        StoredValue::Float(f)
    }
}
