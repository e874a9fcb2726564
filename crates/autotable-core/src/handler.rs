//! Auto-table recovery orchestration
//!
//! Turns a failed insert against a nonexistent table into a statement batch
//! (synthesized create-table followed by the original statement(s)), runs it
//! sequentially against the backend on a background task, and hands the
//! final backend response back in the caller's original wire shape.

use crate::client::{RequestTarget, Transport};
use crate::error::{CoreError, Result};
use crate::parser::InsertParser;
use crate::settings::Settings;
use crate::task::TaskHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Context of an insert the backend rejected for a missing table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedInsert {
    /// Wire path the caller originally hit; the final statement's response
    /// is produced through the same path
    pub path: String,

    /// Content type of the original request, when the caller sent one
    pub content_type: Option<String>,

    /// The insert document(s): one JSON object or a newline-delimited stream
    pub payload: String,

    /// The original statement(s), replayed verbatim after table creation
    pub statements: Vec<String>,

    /// The backend's rejection message for the initial insert
    pub rejection: String,
}

/// Result of a completed recovery: the final backend response, decoded
pub type TaskResult = serde_json::Value;

/// Orchestrates one recovery per failed-insert event
pub struct RecoveryHandler {
    settings: Settings,
    transport: Arc<dyn Transport>,
}

impl RecoveryHandler {
    pub fn new(settings: Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// Start a recovery for one failed insert
    ///
    /// Precondition failures surface here, before any document is parsed or
    /// any backend call is made. On success the whole parse/build/execute
    /// sequence runs as one background task; the returned handle joins on
    /// its terminal result.
    pub fn handle(&self, request: FailedInsert) -> Result<TaskHandle<TaskResult>> {
        if !self.settings.rt_mode {
            return Err(CoreError::configuration(
                "Cannot create the table automatically in plain mode. \
                 Make sure the table exists before inserting into it",
            ));
        }

        if !self.settings.auto_schema {
            return Err(CoreError::FeatureDisabled);
        }

        if request.statements.is_empty() {
            return Err(CoreError::internal(
                "failed insert carried no statements to replay",
            ));
        }

        info!(
            path = %request.path,
            statements = request.statements.len(),
            rejection = %request.rejection,
            "starting auto-table recovery"
        );

        let transport = Arc::clone(&self.transport);
        Ok(TaskHandle::spawn(run_recovery(transport, request)))
    }
}

/// One end-to-end recovery: infer schema, build the batch, execute it
/// sequentially, decode the final response
async fn run_recovery(
    transport: Arc<dyn Transport>,
    request: FailedInsert,
) -> Result<TaskResult> {
    let mut parser = InsertParser::new();
    parser.parse_payload(&request.payload)?;
    let schema = parser.finish()?;
    info!(
        table = %schema.table,
        columns = schema.columns.len(),
        "inferred schema for missing table"
    );

    let mut statements = Vec::with_capacity(request.statements.len() + 1);
    statements.push(schema.create_statement());
    statements.extend(request.statements);

    let total = statements.len();
    let mut last = None;
    for (i, statement) in statements.iter().enumerate() {
        // The final statement goes out through the caller's original path
        // and content type so the response matches what the caller sent
        let target = if i + 1 == total {
            RequestTarget::new(request.path.clone(), request.content_type.as_deref())
        } else {
            RequestTarget::sql_default()
        };

        debug!(statement = %statement, path = %target.path, "executing statement");
        // Abort on the first failure; statements already executed (the
        // created table included) stay in place
        let response = transport.send(statement, &target).await?;
        last = Some(response);
    }

    let response = last.ok_or_else(|| CoreError::internal("statement batch was empty"))?;
    serde_json::from_str(&response.body).map_err(|e| {
        CoreError::execution(format!("backend returned a malformed response body: {e}"))
    })
}
