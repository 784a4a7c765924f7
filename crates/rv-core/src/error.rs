//! Attribute validation error.
//!
//! Every crate that decodes XML values reports bad input through
//! [`AttrError`] and wraps it in its own error enum via `#[from]`.

use thiserror::Error;

/// A required value was missing or could not be decoded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttrError {
    #[error("<{element}> is missing a value for required field `{field}`")]
    Missing { element: String, field: String },

    #[error("invalid value {value:?} for `{field}` of <{element}>: {reason}")]
    Invalid {
        element: String,
        field:   String,
        value:   String,
        reason:  String,
    },
}

/// Shorthand result type for attribute decoding.
pub type AttrResult<T> = Result<T, AttrError>;
