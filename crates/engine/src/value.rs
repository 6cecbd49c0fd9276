//! Field value normalization and numeric coercion.
//!
//! Host columns arrive as scalars, reference objects or reference lists; the
//! grid only ever needs a display string (or nothing) and, for the order
//! slots, a number.

use pivotgrid_protocol::FieldValue;

/// Display string of a field value. `None` only for null.
///
/// Lists join their elements with `", "`; each element goes through the same
/// reference-or-scalar rule (a null element contributes an empty string).
pub fn normalize(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Null => None,
        FieldValue::List(items) => Some(
            items
                .iter()
                .map(scalar_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(scalar_text(other)),
    }
}

fn scalar_text(value: &FieldValue) -> String {
    match value {
        // Only reachable for list elements; a null reference in a list shows
        // as a blank entry rather than the text "null"
        FieldValue::Null => String::new(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Number(n) => format_number(*n),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Reference { name } => name.clone(),
        FieldValue::List(_) => normalize(value).unwrap_or_default(),
    }
}

/// Shortest round-trip text for a number, the way a host renders raw values.
///
/// Magnitudes from 1e21 up and below 1e-6 use exponent form with an explicit
/// sign (`1e+21`, `1.5e-7`); everything else is plain decimal.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        format!("{n}")
    }
}

/// Permissive numeric-string coercion.
///
/// Accepts surrounding whitespace, signs, decimals, exponents, `0x`/`0o`/`0b`
/// integer literals and `Infinity`. Blank input is not a number.
pub fn coerce_number(input: &str) -> Option<f64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    // Rust's float parser also takes "inf"/"nan"; the only letters allowed here are exponents
    if s.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return None;
    }

    s.parse::<f64>().ok()
}

/// True when the text coerces to a finite number.
pub fn is_finite_number(s: &str) -> bool {
    coerce_number(s).is_some_and(f64::is_finite)
}

/// Numeric order hint carried by an order slot.
///
/// Returns the raw coerced number, which may be NaN or infinite; validity is
/// decided by the axis builder.
pub fn order_hint(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Null => None,
        FieldValue::Number(n) => Some(*n),
        FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        FieldValue::Text(s) => Some(coerce_number(s).unwrap_or(f64::NAN)),
        FieldValue::Reference { .. } | FieldValue::List(_) => Some(f64::NAN),
    }
}
