//! Required-value checks and value parsing for XML attributes and
//! sub-element text.
//!
//! All functions take the element and field names purely for the error
//! message, so a failure reads like
//! `invalid value "abc" for `time` of <event>: invalid float literal`.

use crate::{AttrError, AttrResult};

/// Return the trimmed value if it is present and non-empty.
pub fn require<'a>(element: &str, field: &str, value: Option<&'a str>) -> AttrResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AttrError::Missing {
            element: element.to_owned(),
            field:   field.to_owned(),
        }),
    }
}

/// Parse a double-precision value.
pub fn parse_f64(element: &str, field: &str, value: &str) -> AttrResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(element, field, value, e.to_string()))
}

/// Parse an event timestamp: a finite, non-negative double.
pub fn parse_time(element: &str, field: &str, value: &str) -> AttrResult<f64> {
    let t = parse_f64(element, field, value)?;
    if !t.is_finite() || t < 0.0 {
        return Err(invalid(element, field, value, "time must be finite and non-negative".into()));
    }
    Ok(t)
}

/// Parse a boolean.  Only the literals `true` and `false` are accepted.
pub fn parse_bool(element: &str, field: &str, value: &str) -> AttrResult<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(
            element,
            field,
            value,
            "only \"true\" and \"false\" are allowed".into(),
        )),
    }
}

/// Parse an optional double, treating an absent attribute as `default`.
pub fn parse_f64_or(
    element: &str,
    field:   &str,
    value:   Option<&str>,
    default: f64,
) -> AttrResult<f64> {
    match value {
        None => Ok(default),
        Some(v) => parse_f64(element, field, v),
    }
}

fn invalid(element: &str, field: &str, value: &str, reason: String) -> AttrError {
    AttrError::Invalid {
        element: element.to_owned(),
        field:   field.to_owned(),
        value:   value.to_owned(),
        reason,
    }
}
