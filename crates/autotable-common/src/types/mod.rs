//! Shared types for document decoding and schema inference

pub mod datatype;
pub mod value;

pub use datatype::{detect, detect_list, is_identifier_like, Datatype};
pub use value::FieldValue;
