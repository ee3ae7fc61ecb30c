//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Utility functions for the validation engine
//!
//! Number comparisons route through `rust_decimal` where exactness matters:
//! a pure f64 check misclassifies values like `0.1 * 3` against `0.3`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;

/// JSON type name of a value, as used in error messages and `type` checks
pub fn type_name_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a JSON number is mathematically an integer
///
/// `1.0` counts as whole; this is the tie-break rule between `integer` and
/// `number` in the `type` keyword.
pub fn is_whole_number(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                true
            } else {
                n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false)
            }
        }
        _ => false,
    }
}

/// Exact multiple-of check
///
/// Performed in decimal arithmetic when both operands are representable;
/// falls back to an f64 remainder for values outside the decimal range.
pub fn is_multiple_of(value: f64, factor: f64) -> bool {
    if factor == 0.0 {
        return false;
    }
    match (Decimal::from_f64(value), Decimal::from_f64(factor)) {
        (Some(v), Some(f)) if !f.is_zero() => (v % f).is_zero(),
        _ => {
            let remainder = (value / factor).fract();
            remainder == 0.0 || remainder.abs() < f64::EPSILON
        }
    }
}

/// Structural equality with numeric awareness
///
/// `serde_json::Value` equality distinguishes integer and float
/// representations of the same number; `enum` and `const` must not.
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(fx), Some(fy)) => {
                match (Decimal::from_f64(fx), Decimal::from_f64(fy)) {
                    (Some(dx), Some(dy)) => dx == dy,
                    _ => fx == fy,
                }
            }
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map(|y| json_eq(x, y)).unwrap_or(false))
        }
        _ => a == b,
    }
}

/// Count Unicode code points, not UTF-16 code units or bytes
pub fn unicode_length(input: &str) -> usize {
    input.chars().count()
}

/// Render an error message template
///
/// Each `{{token}}` is replaced with the string form of the matching entry;
/// unknown tokens are left literal.
pub fn render_template(template: &str, tokens: &BTreeMap<String, Value>) -> String {
    let mut rendered = template.to_string();
    for (token, value) in tokens {
        let needle = format!("{{{{{}}}}}", token);
        if rendered.contains(&needle) {
            rendered = rendered.replace(&needle, &value_to_display(value));
        }
    }
    rendered
}

/// String form of a value for message substitution
///
/// Strings render without surrounding quotes; everything else renders as
/// compact JSON.
pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
