//! Numeric assertions: bounds and `multipleOf`.
//!
//! `multipleOf` deliberately avoids floating-point remainder tests, which
//! report `0.0075 % 0.0001 != 0`. Both numbers are reconstructed as exact
//! decimal rationals (the shortest round-trip decimal of the parsed float
//! is the literal the document author wrote) and divisibility is decided
//! with integer arithmetic. Only when the mantissas exceed `i128` does the
//! check fall back to a quotient test.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use jsonward_core::number_cmp;

use super::fmt_value;

pub(crate) fn check_maximum(limit: &Value, instance: &Number) -> Option<String> {
    let limit = limit.as_number()?;
    if matches!(number_cmp(instance, limit), Some(Ordering::Greater)) {
        return Some(format!(
            "{instance} is greater than the maximum of {limit}"
        ));
    }
    None
}

pub(crate) fn check_exclusive_maximum(limit: &Value, instance: &Number) -> Option<String> {
    let limit = limit.as_number()?;
    if !matches!(number_cmp(instance, limit), Some(Ordering::Less)) {
        return Some(format!(
            "{instance} is not less than the exclusiveMaximum of {limit}"
        ));
    }
    None
}

pub(crate) fn check_minimum(limit: &Value, instance: &Number) -> Option<String> {
    let limit = limit.as_number()?;
    if matches!(number_cmp(instance, limit), Some(Ordering::Less)) {
        return Some(format!("{instance} is less than the minimum of {limit}"));
    }
    None
}

pub(crate) fn check_exclusive_minimum(limit: &Value, instance: &Number) -> Option<String> {
    let limit = limit.as_number()?;
    if !matches!(number_cmp(instance, limit), Some(Ordering::Greater)) {
        return Some(format!(
            "{instance} is not greater than the exclusiveMinimum of {limit}"
        ));
    }
    None
}

pub(crate) fn check_multiple_of(divisor: &Value, instance: &Number) -> Option<String> {
    let divisor = divisor.as_number()?;
    if is_multiple_of(instance, divisor) {
        return None;
    }
    Some(format!(
        "{} is not a multiple of {}",
        fmt_value(&Value::Number(instance.clone())),
        divisor
    ))
}

/// Tolerance-free divisibility test on JSON numbers.
fn is_multiple_of(value: &Number, divisor: &Number) -> bool {
    // Exact integer path.
    if let (Some(v), Some(d)) = (int_of(value), int_of(divisor)) {
        if d == 0 {
            return false;
        }
        return v % d == 0;
    }
    let (Some(v), Some(d)) = (value.as_f64(), divisor.as_f64()) else {
        return false;
    };
    if d == 0.0 || !v.is_finite() || !d.is_finite() {
        return false;
    }
    match (decimal_decompose(v), decimal_decompose(d)) {
        (Some(a), Some(b)) => decimal_divisible(a, b).unwrap_or_else(|| {
            // Scale difference too large for i128; quotient fallback.
            (v / d).fract() == 0.0
        }),
        _ => (v / d).fract() == 0.0,
    }
}

fn int_of(n: &Number) -> Option<i128> {
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    n.as_u64().map(i128::from)
}

/// Decide whether `(a1 * 10^e1) / (a2 * 10^e2)` is an integer. Returns
/// `None` when the rescaled mantissa would not fit in `i128`.
fn decimal_divisible((a1, e1): (i128, i32), (a2, e2): (i128, i32)) -> Option<bool> {
    if a2 == 0 {
        return Some(false);
    }
    if a1 == 0 {
        return Some(true);
    }
    let shift = e1 - e2;
    if shift >= 0 {
        let scaled = a1.checked_mul(pow10(shift as u32)?)?;
        Some(scaled % a2 == 0)
    } else {
        let scaled_divisor = a2.checked_mul(pow10((-shift) as u32)?)?;
        Some(a1 % scaled_divisor == 0)
    }
}

/// Reconstruct the decimal rational behind a float: `x == m * 10^e`.
///
/// Uses the shortest round-trip decimal rendering, which recovers the
/// literal as written for any JSON number that survived parsing. Returns
/// `None` if the mantissa has more digits than `i128` holds.
fn decimal_decompose(x: f64) -> Option<(i128, i32)> {
    let text = format!("{x}");
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    let frac_part = frac_part.trim_end_matches('0');
    let mut exponent = -(frac_part.len() as i32);
    let digits = format!("{int_part}{frac_part}");
    let digits = digits.trim_start_matches('0');
    let stripped = digits.trim_end_matches('0');
    exponent += (digits.len() - stripped.len()) as i32;
    if stripped.is_empty() {
        return Some((0, 0));
    }
    if stripped.len() > 38 {
        return None;
    }
    let mantissa: i128 = stripped.parse().ok()?;
    Some((if negative { -mantissa } else { mantissa }, exponent))
}

fn pow10(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}
