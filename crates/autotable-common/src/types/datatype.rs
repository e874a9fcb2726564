//! Column datatypes and value classification
//!
//! Maps decoded document values to the backend's column types. Classification
//! is pure; widening across rows is handled by [`Datatype::widen`].

use super::value::FieldValue;
use std::fmt;

/// Largest value a standard signed integer column holds; anything integral
/// outside this magnitude needs a bigint column.
pub const MAX_INT_COLUMN: i128 = i32::MAX as i128;

/// Inferred column datatype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// No evidence yet (only nulls seen)
    Null,
    Int,
    Bigint,
    Float,
    String,
    Text,
    Json,
    /// Multi-value integer attribute
    Multi,
    /// Multi-value 64-bit integer attribute
    Multi64,
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Datatype::Null => "null",
            Datatype::Int => "int",
            Datatype::Bigint => "bigint",
            Datatype::Float => "float",
            Datatype::String => "string",
            Datatype::Text => "text",
            Datatype::Json => "json",
            Datatype::Multi => "multi",
            Datatype::Multi64 => "multi64",
        };
        write!(f, "{}", label)
    }
}

impl Datatype {
    /// Merge a newly detected type into this slot.
    ///
    /// Widening is monotonic: `Null` accepts any concrete type, and within a
    /// family the wider member wins (`Int`/`Bigint`, `Multi`/`Multi64`,
    /// `String`/`Text`). Returns `None` for any other combination; the caller
    /// treats that as a validation failure, never a silent overwrite.
    pub fn widen(self, incoming: Datatype) -> Option<Datatype> {
        use Datatype::*;
        match (self, incoming) {
            (a, b) if a == b => Some(a),
            (Null, other) | (other, Null) => Some(other),
            (Int, Bigint) | (Bigint, Int) => Some(Bigint),
            (Multi, Multi64) | (Multi64, Multi) => Some(Multi64),
            (String, Text) | (Text, String) => Some(Text),
            _ => None,
        }
    }
}

/// Classify one decoded value
pub fn detect(value: &FieldValue) -> Datatype {
    match value {
        FieldValue::Null => Datatype::Null,
        FieldValue::Float(_) => Datatype::Float,
        FieldValue::Int(v) => {
            if *v > MAX_INT_COLUMN || *v < -(MAX_INT_COLUMN + 1) {
                Datatype::Bigint
            } else {
                Datatype::Int
            }
        },
        FieldValue::List(items) => detect_list(items),
        // An object is never a true list, so it lands in a json column
        FieldValue::Object(_) => Datatype::Json,
        FieldValue::Str(s) => {
            if is_identifier_like(s) {
                Datatype::String
            } else {
                Datatype::Text
            }
        },
        FieldValue::Bool(_) => Datatype::Text,
    }
}

/// Classify a list value
///
/// A homogeneous integer list is a multi-value attribute, widened to
/// `Multi64` when any element needs a bigint. Any non-integer element
/// disqualifies the list and it resolves to `Json`. An empty list satisfies
/// the homogeneity check vacuously and resolves to `Multi`.
pub fn detect_list(items: &[FieldValue]) -> Datatype {
    let mut result = Datatype::Multi;
    for item in items {
        match detect(item) {
            Datatype::Bigint => result = Datatype::Multi64,
            Datatype::Int => {},
            _ => return Datatype::Json,
        }
    }
    result
}

/// Safe identifier-like string predicate
///
/// Strings that pass are stored in a `string` column; everything else falls
/// back to full-text `text`.
pub fn is_identifier_like(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            !c.is_whitespace()
                && !c.is_control()
                && c != '"'
                && c != '\''
                && c != '`'
                && c != '\\'
        })
}
