// SPDX-License-Identifier: GPL-3.0-only
//! Brightness normalization
//!
//! Out-of-range requests are coerced into (0, 1], never rejected. Each
//! coercion produces a [`Notice`] that the caller prints to stdout.

use std::fmt;

use crate::config::Config;

/// Brightness used when the request is zero, negative or unparseable
pub const DEFAULT_FALLBACK_BRIGHTNESS: f64 = 0.5;

/// Full brightness, the identity ramp
pub const MAX_BRIGHTNESS: f64 = 1.0;

/// Parse a brightness argument the way `atof` does
///
/// Leading whitespace is skipped and the longest numeric prefix wins, so
/// `"0.75x"` reads as 0.75. An optional sign may precede a decimal number,
/// an `inf`/`infinity` prefix (any case) or a `0x` hexadecimal float such as
/// `0x.C` or `0x1p-1`. Input without a numeric prefix reads as 0.0.
pub fn parse_lenient(input: &str) -> f64 {
    let trimmed = input.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = parse_infinity(unsigned)
        .or_else(|| parse_hex(unsigned))
        .unwrap_or_else(|| parse_decimal(unsigned));

    if negative { -magnitude } else { magnitude }
}

fn parse_infinity(unsigned: &str) -> Option<f64> {
    unsigned
        .get(..3)
        .filter(|prefix| prefix.eq_ignore_ascii_case("inf"))
        .map(|_| f64::INFINITY)
}

/// `0x` mantissa with an optional binary exponent (`p`/`P`)
fn parse_hex(unsigned: &str) -> Option<f64> {
    let bytes = unsigned.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' || !matches!(bytes[1], b'x' | b'X') {
        return None;
    }

    let mut rest = &bytes[2..];
    let mut mantissa = 0.0_f64;
    let mut scale = 1.0_f64;
    let mut seen_digit = false;
    let mut seen_point = false;
    while let Some((&b, tail)) = rest.split_first() {
        if b == b'.' && !seen_point {
            seen_point = true;
        } else if let Some(digit) = (b as char).to_digit(16) {
            seen_digit = true;
            if seen_point {
                scale /= 16.0;
                mantissa += f64::from(digit) * scale;
            } else {
                mantissa = mantissa * 16.0 + f64::from(digit);
            }
        } else {
            break;
        }
        rest = tail;
    }

    // "0x" without digits is the number 0 followed by junk
    if !seen_digit {
        return Some(0.0);
    }

    let exponent = match rest.split_first() {
        Some((b'p' | b'P', tail)) => parse_binary_exponent(tail).unwrap_or(0),
        _ => 0,
    };
    Some(mantissa * 2.0_f64.powi(exponent))
}

fn parse_binary_exponent(bytes: &[u8]) -> Option<i32> {
    let (negative, digits) = match bytes.split_first() {
        Some((b'-', tail)) => (true, tail),
        Some((b'+', tail)) => (false, tail),
        _ => (false, bytes),
    };
    let digits: Vec<u32> = digits
        .iter()
        .map_while(|&b| (b as char).to_digit(10))
        .collect();
    if digits.is_empty() {
        return None;
    }

    let value = digits
        .iter()
        .fold(0_i32, |acc, &d| acc.saturating_mul(10).saturating_add(d as i32));
    Some(if negative { -value } else { value })
}

fn parse_decimal(unsigned: &str) -> f64 {
    if unsigned.starts_with(['+', '-']) {
        return 0.0;
    }

    let end = unsigned
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .map(|(i, _)| i)
        .unwrap_or(unsigned.len());
    let candidate = &unsigned[..end];

    (1..=candidate.len())
        .rev()
        .find_map(|len| candidate[..len].parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Informational message emitted when a request was adjusted
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Zero, negative or unparseable request replaced by the fallback
    Fallback { fallback: f64 },
    /// Request of 1 or more capped to full brightness
    Capped,
    /// Request below the configured minimum for the output
    RaisedToMinimum { output: String, requested: f64, minimum: f64 },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Fallback { fallback } => write!(
                f,
                "Brightness cannot be zero or negative, defaulting to {fallback:.2}"
            ),
            Notice::Capped => write!(f, "Brightness cannot exceed 1, defaulting to 1"),
            Notice::RaisedToMinimum {
                output,
                requested,
                minimum,
            } => write!(
                f,
                "Brightness {requested:.2} is below the minimum of {minimum:.2} configured for {output}, using {minimum:.2}"
            ),
        }
    }
}

/// Result of normalizing a brightness request
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Value that will be applied, always in (0, 1]
    pub value: f64,
    pub notices: Vec<Notice>,
}

/// Applies the coercion policy and per-output minimum from the configuration
pub struct BrightnessCalculator<'a> {
    config: &'a Config,
}

impl<'a> BrightnessCalculator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Normalize `requested` for the output named `output`
    ///
    /// * `requested <= 0` (or NaN) → configured fallback
    /// * `requested >= 1` → 1.0
    /// * anything else is kept, then raised to the output's minimum if one
    ///   is configured
    pub fn normalize(&self, requested: f64, output: &str) -> Normalized {
        let mut notices = Vec::new();

        let mut value = if requested.is_nan() || requested <= 0.0 {
            let fallback = self.config.fallback_brightness;
            notices.push(Notice::Fallback { fallback });
            fallback
        } else if requested >= MAX_BRIGHTNESS {
            notices.push(Notice::Capped);
            MAX_BRIGHTNESS
        } else {
            requested
        };

        let minimum = self.config.min_brightness(output);
        if value < minimum {
            tracing::debug!(
                output = %output,
                calculated = %value,
                min = %minimum,
                "Clamping brightness to minimum"
            );
            notices.push(Notice::RaisedToMinimum {
                output: output.to_string(),
                requested: value,
                minimum,
            });
            value = minimum;
        }

        Normalized { value, notices }
    }
}
