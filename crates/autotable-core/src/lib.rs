//! Autotable Core Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Recovery layer for inserts that fail against a nonexistent table. The
//! schema of the missing table is inferred from the insert document(s), the
//! table is created, and the original insert is replayed, transparently to
//! the caller.
//!
//! # Overview
//!
//! - **Parser**: schema inference over one insert document or a
//!   newline-delimited batch, with monotonic type widening
//! - **Handler**: precondition checks, statement-batch construction, and
//!   strictly sequential execution on a background task
//! - **Client**: HTTP transport to the backend's statement endpoint
//! - **Settings**: environment-based configuration
//!
//! # Example
//!
//! ```no_run
//! use autotable_core::client::HttpTransport;
//! use autotable_core::handler::{FailedInsert, RecoveryHandler};
//! use autotable_core::settings::Settings;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let transport = Arc::new(HttpTransport::from_settings(&settings)?);
//!     let handler = RecoveryHandler::new(settings, transport);
//!
//!     let task = handler.handle(FailedInsert {
//!         path: "sql?mode=raw".to_string(),
//!         content_type: None,
//!         payload: r#"{"index": "t", "doc": {"col1": 1}}"#.to_string(),
//!         statements: vec!["INSERT INTO t(col1) VALUES(1)".to_string()],
//!         rejection: "table 't' absent".to_string(),
//!     })?;
//!
//!     let response = task.wait().await?;
//!     println!("{response}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod handler;
pub mod parser;
pub mod settings;
pub mod task;

// Re-export commonly used types
pub use error::{CoreError, ParseError, Result};
pub use handler::{FailedInsert, RecoveryHandler, TaskResult};
pub use parser::{InferredSchema, InsertParser};
