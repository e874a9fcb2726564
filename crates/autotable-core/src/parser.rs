//! Schema inference over insert documents
//!
//! Consumes the document(s) of a failed insert and accumulates a column
//! ledger (names, first-seen order) with a parallel type ledger (widened
//! datatypes). A payload with more than one line is treated as a
//! newline-delimited stream, where each document is wrapped in the `insert`
//! operation keyword; a single line is one bare document.
//!
//! One parser instance serves exactly one recovery; the ledger is never
//! shared across events.

use crate::error::ParseError;
use autotable_common::types::{detect, Datatype, FieldValue};
use tracing::debug;

type ParseResult<T> = std::result::Result<T, ParseError>;

/// One document body: ordered column name / value pairs
pub type Row = Vec<(String, FieldValue)>;

/// A column of the inferred schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub datatype: Datatype,
}

/// Final schema inferred from a batch of insert documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredSchema {
    /// Destination table name
    pub table: String,
    /// Columns in first-seen order with resolved type labels
    pub columns: Vec<Column>,
}

impl InferredSchema {
    /// Synthesize the create-table statement for this schema
    pub fn create_statement(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("`{}` {}", c.name, c.datatype))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS `{}` ({})", self.table, columns)
    }
}

/// Incremental schema-inference parser
///
/// Feed it a whole payload with [`parse_payload`](Self::parse_payload) (or
/// individual decoded documents with [`parse_row`](Self::parse_row)), then
/// take the result with [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct InsertParser {
    streaming: bool,
    table: Option<String>,
    columns: Vec<String>,
    types: Vec<Datatype>,
}

impl InsertParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the payload activated streaming (newline-delimited) mode
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Column names accumulated so far, in first-seen order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Resolved types, parallel to [`columns`](Self::columns)
    pub fn types(&self) -> &[Datatype] {
        &self.types
    }

    /// Parse a full insert payload: one JSON document, or several separated
    /// by newlines
    pub fn parse_payload(&mut self, payload: &str) -> ParseResult<()> {
        let lines: Vec<&str> = payload
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        self.streaming = lines.len() > 1;

        for line in lines {
            let doc: FieldValue = serde_json::from_str(line)?;
            self.parse_row(&doc)?;
        }
        Ok(())
    }

    /// Validate one document's envelope and return its body
    fn extract_row(&mut self, doc: &FieldValue) -> ParseResult<Row> {
        let doc = if self.streaming {
            doc.get("insert")
                .ok_or(ParseError::MissingOperation("insert"))?
        } else {
            doc
        };

        let doc = match doc {
            FieldValue::Object(_) => doc,
            _ => return Err(ParseError::FieldType("insert", "an object")),
        };

        let table = doc
            .get("index")
            .ok_or(ParseError::MissingField("index"))?
            .as_str()
            .ok_or(ParseError::FieldType("index", "a string"))?;
        self.table = Some(table.to_string());

        let body = doc.get("doc").ok_or(ParseError::MissingField("doc"))?;
        match body.as_object() {
            Some(fields) => Ok(fields.to_vec()),
            None => Err(ParseError::FieldType("doc", "an object")),
        }
    }

    /// Parse one document and merge it into the ledger
    ///
    /// An empty document contributes no columns. Otherwise new column names
    /// are appended in first-seen order, values are validated against the
    /// disallowed-character policy, and each non-null value's detected type
    /// is widened into its ledger slot.
    pub fn parse_row(&mut self, doc: &FieldValue) -> ParseResult<Row> {
        let row = self.extract_row(doc)?;
        if row.is_empty() {
            return Ok(row);
        }

        for (key, _) in &row {
            if !self.columns.contains(key) {
                self.columns.push(key.clone());
                self.types.push(Datatype::Null);
            }
        }

        // Value vector positioned by the ledger; absent columns hold null
        let values: Vec<FieldValue> = self
            .columns
            .iter()
            .map(|column| {
                row.iter()
                    .find(|(key, _)| key == column)
                    .map(|(_, value)| value.clone())
                    .unwrap_or(FieldValue::Null)
            })
            .collect();

        for (key, value) in &row {
            if key.chars().any(char::is_control) || value.has_control_chars() {
                return Err(ParseError::DisallowedChars(key.clone()));
            }
        }

        for (i, value) in values.iter().enumerate() {
            if value.is_null() {
                continue;
            }
            let incoming = detect(value);
            let current = self.types[i];
            match current.widen(incoming) {
                Some(widened) => self.types[i] = widened,
                None => {
                    return Err(ParseError::TypeConflict {
                        column: self.columns[i].clone(),
                        current,
                        incoming,
                    })
                },
            }
        }

        debug_assert_eq!(self.columns.len(), self.types.len());
        Ok(row)
    }

    /// Finalize the ledger into an inferred schema
    pub fn finish(self) -> ParseResult<InferredSchema> {
        let table = self.table.ok_or(ParseError::NoDocuments)?;
        debug!(table = %table, columns = self.columns.len(), "schema inference finished");

        let columns = self
            .columns
            .into_iter()
            .zip(self.types)
            .map(|(name, datatype)| Column {
                name,
                // A column that only ever saw nulls carries no evidence;
                // text accepts whatever the replayed insert holds
                datatype: if datatype == Datatype::Null {
                    Datatype::Text
                } else {
                    datatype
                },
            })
            .collect();

        Ok(InferredSchema { table, columns })
    }
}
