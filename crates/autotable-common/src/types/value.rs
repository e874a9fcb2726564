//! Decoded document values
//!
//! Insert documents are decoded from the wire exactly once into [`FieldValue`],
//! a tagged representation that keeps the numeric kind (integral vs floating)
//! explicit and preserves object key order. All later classification works on
//! these tags instead of re-probing raw JSON.

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// One decoded value from an insert document
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// JSON null
    Null,
    /// JSON boolean
    Bool(bool),
    /// Integral number; i128 holds the full u64/i64 wire range losslessly
    Int(i128),
    /// Floating-point number
    Float(f64),
    /// String
    Str(String),
    /// JSON array
    List(Vec<FieldValue>),
    /// JSON object, in wire key order
    Object(Vec<(String, FieldValue)>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Borrow the fields of an object value, in wire order
    pub fn as_object(&self) -> Option<&[(String, FieldValue)]> {
        match self {
            FieldValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a field of an object value by key
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.as_object()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// True if any string in this value (or any nested key) contains a
    /// control character
    pub fn has_control_chars(&self) -> bool {
        match self {
            FieldValue::Str(s) => s.chars().any(char::is_control),
            FieldValue::List(items) => items.iter().any(FieldValue::has_control_chars),
            FieldValue::Object(fields) => fields
                .iter()
                .any(|(k, v)| k.chars().any(char::is_control) || v.has_control_chars()),
            _ => false,
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldValueVisitor;

        impl<'de> Visitor<'de> for FieldValueVisitor {
            type Value = FieldValue;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a JSON value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<FieldValue, E> {
                Ok(FieldValue::Null)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldValue, E> {
                Ok(FieldValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldValue, E> {
                Ok(FieldValue::Int(v as i128))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldValue, E> {
                Ok(FieldValue::Int(v as i128))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FieldValue, E> {
                Ok(FieldValue::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldValue, E> {
                Ok(FieldValue::Str(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<FieldValue, E> {
                Ok(FieldValue::Str(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<FieldValue, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(FieldValue::List(items))
            }

            fn visit_map<A>(self, mut map: A) -> Result<FieldValue, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    fields.push(entry);
                }
                Ok(FieldValue::Object(fields))
            }
        }

        deserializer.deserialize_any(FieldValueVisitor)
    }
}
