//! Exact decimal numbers for canonical metadata.
//!
//! JSON number literals are decoded from their source text into
//! `(sign, digits, exponent)` with no binary floating point involved, then
//! emitted in a single canonical spelling:
//!
//! - Zero (including `-0`) is `0`.
//! - With `n` the position of the decimal point relative to the first
//!   significant digit (value = `0.d1d2...dk * 10^n`):
//!   - `k <= n <= 21`: integer digits padded with zeros (`1e3` is `1000`)
//!   - `0 < n <= 21`: digits with an inner decimal point (`1.50` is `1.5`)
//!   - `-6 < n <= 0`: leading `0.` and zeros (`1e-3` is `0.001`)
//!   - otherwise: `d1.d2...dke±(n-1)` (`1e21` is `1e+21`)
//!
//! Literals already written in shortest plain form (`2`, `1.5`, `-40`)
//! come out byte-for-byte unchanged.

use std::fmt;

use crate::error::CanonicalError;

/// Largest decimal-point position rendered without an exponent.
const MAX_PLAIN_POSITION: i64 = 21;

/// Smallest (exclusive) decimal-point position rendered without an exponent.
const MIN_PLAIN_POSITION: i64 = -6;

/// Exponent literals longer than this are rejected rather than overflowing.
const MAX_EXPONENT_DIGITS: usize = 15;

/// An exact decimal value decoded from a JSON number literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalNumber {
    negative: bool,
    /// Significant digits, no leading or trailing zeros. Empty means zero.
    digits: String,
    /// Power of ten applied to `digits` read as an integer.
    exponent: i64,
}

impl CanonicalNumber {
    /// Decode a JSON number literal.
    ///
    /// Accepts exactly the JSON grammar:
    /// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
    pub fn parse(literal: &str) -> Result<Self, CanonicalError> {
        let malformed = || CanonicalError::MalformedInput(format!("invalid number {literal:?}"));

        let (negative, rest) = match literal.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, literal),
        };

        let (mantissa, exp_part) = match rest.find(['e', 'E']) {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };

        let (int_part, frac_part) = match mantissa.find('.') {
            Some(pos) => (&mantissa[..pos], &mantissa[pos + 1..]),
            None => (mantissa, ""),
        };

        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if int_part.len() > 1 && int_part.starts_with('0') {
            return Err(malformed());
        }
        if mantissa.contains('.')
            && (frac_part.is_empty() || !frac_part.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(malformed());
        }

        let exp_value = match exp_part {
            Some(exp) => parse_exponent(exp).ok_or_else(|| {
                CanonicalError::MalformedInput(format!("number exponent out of range {literal:?}"))
            })?,
            None => 0,
        };

        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);

        let frac_len = i64::try_from(frac_part.len()).map_err(|_| malformed())?;
        let mut exponent = exp_value - frac_len;

        let significant = digits.trim_start_matches('0');
        let trimmed = significant.trim_end_matches('0');
        let trailing = i64::try_from(significant.len() - trimmed.len()).map_err(|_| malformed())?;
        exponent += trailing;

        if trimmed.is_empty() {
            return Ok(Self::zero());
        }

        Ok(Self {
            negative,
            digits: trimmed.to_owned(),
            exponent,
        })
    }

    fn zero() -> Self {
        Self {
            negative: false,
            digits: String::new(),
            exponent: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Append the canonical spelling to `out`.
    pub fn write_canonical(&self, out: &mut String) {
        if self.is_zero() {
            out.push('0');
            return;
        }
        if self.negative {
            out.push('-');
        }

        let k = self.digits.len() as i64;
        let n = self.exponent + k;

        if k <= n && n <= MAX_PLAIN_POSITION {
            out.push_str(&self.digits);
            push_zeros(out, n - k);
        } else if 0 < n && n <= MAX_PLAIN_POSITION {
            let split = n as usize;
            out.push_str(&self.digits[..split]);
            out.push('.');
            out.push_str(&self.digits[split..]);
        } else if MIN_PLAIN_POSITION < n && n <= 0 {
            out.push_str("0.");
            push_zeros(out, -n);
            out.push_str(&self.digits);
        } else {
            out.push_str(&self.digits[..1]);
            if k > 1 {
                out.push('.');
                out.push_str(&self.digits[1..]);
            }
            let e = n - 1;
            out.push('e');
            out.push(if e < 0 { '-' } else { '+' });
            out.push_str(&e.unsigned_abs().to_string());
        }
    }

    /// The canonical spelling as a new string.
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }
}

impl fmt::Display for CanonicalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

fn parse_exponent(exp: &str) -> Option<i64> {
    let (negative, digits) = match exp.as_bytes().first()? {
        b'-' => (true, &exp[1..]),
        b'+' => (false, &exp[1..]),
        _ => (false, exp),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = digits.trim_start_matches('0');
    if digits.len() > MAX_EXPONENT_DIGITS {
        return None;
    }
    let value: i64 = if digits.is_empty() { 0 } else { digits.parse().ok()? };
    Some(if negative { -value } else { value })
}

fn push_zeros(out: &mut String, count: i64) {
    for _ in 0..count {
        out.push('0');
    }
}
