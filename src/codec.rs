//! Value codec.
//!
//! Converts the scalar values the cache accepts to the byte strings the store
//! holds, and back. Writes always encode; raw reads never decode unless a
//! converter is supplied.

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::string::FromUtf8Error;

/// Errors raised when stored bytes cannot be read as the requested type.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Value is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("Value is not a base-10 integer: {value:?}")]
    InvalidInteger {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Value is not a floating-point number: {value:?}")]
    InvalidFloat {
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

/// A scalar accepted by [`Cache::store`](crate::Cache::store).
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Text(String),
    Binary(Vec<u8>),
    Integer(i64),
    Float(f64),
}

impl StoredValue {
    /// Encode into the byte string written to the store.
    ///
    /// Integers are base-10 ASCII. Floats use the shortest decimal that
    /// round-trips and always carry a fractional part (`2.0`, not `2`); very
    /// large or small magnitudes use an exponent (`1e+20`), and the
    /// non-finite values are `inf`, `-inf` and `nan`.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            StoredValue::Text(s) => s.as_bytes().to_vec(),
            StoredValue::Binary(b) => b.clone(),
            StoredValue::Integer(i) => i.to_string().into_bytes(),
            StoredValue::Float(f) => format_float(*f).into_bytes(),
        }
    }

    /// Literal rendering of the value, as recorded in call history.
    ///
    /// Text is quoted (`'hello'`), binary carries a `b` prefix with
    /// non-printable bytes hex-escaped (`b'\x00'`), numbers render bare.
    pub fn repr(&self) -> String {
        match self {
            StoredValue::Text(s) => repr_text(s),
            StoredValue::Binary(b) => repr_binary(b),
            StoredValue::Integer(i) => i.to_string(),
            StoredValue::Float(f) => format_float(*f),
        }
    }
}

impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Text(value)
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Text(value.to_string())
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(value: Vec<u8>) -> Self {
        StoredValue::Binary(value)
    }
}

impl From<&[u8]> for StoredValue {
    fn from(value: &[u8]) -> Self {
        StoredValue::Binary(value.to_vec())
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Integer(value)
    }
}

impl From<i32> for StoredValue {
    fn from(value: i32) -> Self {
        StoredValue::Integer(value.into())
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        StoredValue::Float(value)
    }
}

/// Decode stored bytes as UTF-8 text.
pub fn decode_str(raw: Vec<u8>) -> Result<String, ConversionError> {
    Ok(String::from_utf8(raw)?)
}

/// Decode stored bytes as a base-10 integer. Surrounding whitespace is ignored.
pub fn decode_int(raw: Vec<u8>) -> Result<i64, ConversionError> {
    let text = decode_str(raw)?;
    text.trim()
        .parse()
        .map_err(|source| ConversionError::InvalidInteger {
            value: text.clone(),
            source,
        })
}

/// Decode stored bytes as a floating-point number.
pub fn decode_float(raw: Vec<u8>) -> Result<f64, ConversionError> {
    let text = decode_str(raw)?;
    text.trim()
        .parse()
        .map_err(|source| ConversionError::InvalidFloat {
            value: text.clone(),
            source,
        })
}

/// Decimal exponents outside `-4..16` switch to scientific notation with a
/// signed, at least two-digit exponent (`1e+20`, `1.5e-07`).
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{f:e}");
    if let Some((mantissa, exp)) = sci.split_once('e') {
        if let Ok(exp) = exp.parse::<i32>() {
            if !(-4..16).contains(&exp) {
                let sign = if exp < 0 { '-' } else { '+' };
                return format!("{mantissa}e{sign}{:02}", exp.unsigned_abs());
            }
        }
    }

    let mut s = f.to_string();
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

/// Prefer single quotes; switch to double quotes only when that avoids
/// escaping.
fn pick_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double {
        '"'
    } else {
        '\''
    }
}

/// Controls, separators other than the ASCII space, and the invisible
/// format characters.
fn is_unprintable(c: char) -> bool {
    c.is_control()
        || (c.is_whitespace() && c != ' ')
        || matches!(
            c,
            '\u{ad}'
                | '\u{200b}'..='\u{200f}'
                | '\u{202a}'..='\u{202e}'
                | '\u{2060}'..='\u{2064}'
                | '\u{feff}'
                | '\u{e0001}'
                | '\u{e0020}'..='\u{e007f}'
        )
}

fn repr_text(s: &str) -> String {
    let quote = pick_quote(s.contains('\''), s.contains('"'));
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
            c if is_unprintable(c) => {
                let code = c as u32;
                if code < 0x100 {
                    out.push_str(&format!("\\x{code:02x}"));
                } else if code < 0x10000 {
                    out.push_str(&format!("\\u{code:04x}"));
                } else {
                    out.push_str(&format!("\\U{code:08x}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn repr_binary(b: &[u8]) -> String {
    let quote = pick_quote(b.contains(&b'\''), b.contains(&b'"'));
    let mut out = String::with_capacity(b.len() + 3);
    out.push('b');
    out.push(quote);
    for &byte in b {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            byte if byte as char == quote => {
                out.push('\\');
                out.push(quote);
            }
            0x20..=0x7e => out.push(byte as char),
            byte => out.push_str(&format!("\\x{byte:02x}")),
        }
    }
    out.push(quote);
    out
}
