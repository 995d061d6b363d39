//! Field tokenizing and typed coercion for a single input line.
//!
//! [`FieldParser::parse_line`] splits one line at a time, so the input stays
//! strictly line-framed: an unterminated quote stays open only until the end
//! of its own line.
//!
//! The coercion helpers separate three outcomes: a textually absent value
//! (`Ok(None)`), a number (`Ok(Some(_))`), and present-but-not-numeric text
//! (`Err`). The loader decides what to do with the last one.

use std::mem;

use crate::error::CoerceError;

const MISSING_TOKENS: &[&str] = &["na", "n/a", "null", "nan"];

#[derive(Debug, Clone, Copy)]
pub struct FieldParser {
    delimiter: u8,
}

impl Default for FieldParser {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl FieldParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Splits `line` into raw fields. Always yields at least one field.
    ///
    /// A `"` anywhere in a field toggles quoting and is dropped; inside a
    /// quoted region the delimiter is literal and `""` is one literal quote.
    /// An unterminated quote runs to the end of the line. Fields are not
    /// trimmed.
    pub fn parse_line(&self, line: &str) -> Vec<String> {
        let delimiter = char::from(self.delimiter);
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut quoted = false;
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '"' if quoted && chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => quoted = !quoted,
                ch if ch == delimiter && !quoted => fields.push(mem::take(&mut current)),
                ch => current.push(ch),
            }
        }
        fields.push(current);
        fields
    }
}

pub fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || MISSING_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// Parses the leading integer of `raw`; trailing text is ignored.
pub fn coerce_int(raw: &str) -> Result<Option<i64>, CoerceError> {
    if is_missing(raw) {
        return Ok(None);
    }
    let prefix = integer_prefix(raw.trim_start());
    if prefix.is_empty() {
        return Err(CoerceError::NotNumeric {
            raw: raw.to_string(),
        });
    }
    prefix
        .parse::<i64>()
        .map(Some)
        .map_err(|_| CoerceError::OutOfRange {
            raw: raw.to_string(),
        })
}

pub fn coerce_year(raw: &str) -> Result<Option<i32>, CoerceError> {
    coerce_int(raw)?
        .map(|value| {
            i32::try_from(value).map_err(|_| CoerceError::OutOfRange {
                raw: raw.to_string(),
            })
        })
        .transpose()
}

/// Parses the leading decimal number of `raw`; trailing text is ignored.
pub fn coerce_real(raw: &str) -> Result<Option<f64>, CoerceError> {
    if is_missing(raw) {
        return Ok(None);
    }
    let prefix = real_prefix(raw.trim_start());
    if prefix.is_empty() {
        return Err(CoerceError::NotNumeric {
            raw: raw.to_string(),
        });
    }
    let value: f64 = prefix.parse().map_err(|_| CoerceError::NotNumeric {
        raw: raw.to_string(),
    })?;
    if value.is_nan() {
        return Ok(None);
    }
    if value.is_infinite() && !is_infinity_literal(prefix) {
        return Err(CoerceError::OutOfRange {
            raw: raw.to_string(),
        });
    }
    Ok(Some(value))
}

fn sign_len(text: &str) -> usize {
    usize::from(text.starts_with(['+', '-']))
}

fn digits_len(text: &str) -> usize {
    text.bytes().take_while(u8::is_ascii_digit).count()
}

fn integer_prefix(text: &str) -> &str {
    let sign = sign_len(text);
    let digits = digits_len(&text[sign..]);
    if digits == 0 { "" } else { &text[..sign + digits] }
}

fn real_prefix(text: &str) -> &str {
    let sign = sign_len(text);
    let body = &text[sign..];

    for word in ["infinity", "inf", "nan"] {
        if body
            .get(..word.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(word))
        {
            return &text[..sign + word.len()];
        }
    }

    let int_digits = digits_len(body);
    let mut end = int_digits;
    let mut frac_digits = 0;
    if body[end..].starts_with('.') {
        frac_digits = digits_len(&body[end + 1..]);
        end += 1 + frac_digits;
    }
    if int_digits == 0 && frac_digits == 0 {
        return "";
    }
    let rest = &body[end..];
    if rest.starts_with(['e', 'E']) {
        let exp_sign = sign_len(&rest[1..]);
        let exp_digits = digits_len(&rest[1 + exp_sign..]);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }
    &text[..sign + end]
}

fn is_infinity_literal(prefix: &str) -> bool {
    let unsigned = prefix.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}
