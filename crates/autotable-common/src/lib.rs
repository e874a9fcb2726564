//! Autotable Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared building blocks for the autotable workspace.
//!
//! # Overview
//!
//! This crate provides the pieces used by every autotable component:
//!
//! - **Logging**: Centralized tracing setup driven by `LOG_*` environment
//!   variables
//! - **Types**: The decoded document value model and the column datatype
//!   enumeration used by schema inference

pub mod logging;
pub mod types;

// Re-export commonly used types
pub use types::{Datatype, FieldValue};
