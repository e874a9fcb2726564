//! End-to-end recovery tests against an in-process transport

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use autotable_core::client::{BackendResponse, RequestTarget, Transport};
use autotable_core::error::CoreError;
use autotable_core::handler::{FailedInsert, RecoveryHandler};
use autotable_core::settings::Settings;
use std::sync::{Arc, Mutex};

/// Records every statement sent and serves canned responses
struct MockTransport {
    calls: Mutex<Vec<(String, RequestTarget)>>,
    /// Zero-based call index that should fail, if any
    fail_on: Option<usize>,
    /// Body returned on success
    body: String,
}

impl MockTransport {
    fn new() -> Self {
        Self::with_body(r#"[{"total":1,"error":"","warning":""}]"#)
    }

    fn with_body(body: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            body: body.to_string(),
        }
    }

    fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::new()
        }
    }

    fn calls(&self) -> Vec<(String, RequestTarget)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        statement: &str,
        target: &RequestTarget,
    ) -> Result<BackendResponse, CoreError> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push((statement.to_string(), target.clone()));

        if self.fail_on == Some(index) {
            return Err(CoreError::execution("mock backend rejected the statement"));
        }

        Ok(BackendResponse {
            status: 200,
            body: self.body.clone(),
        })
    }
}

fn settings() -> Settings {
    Settings::default()
}

fn failed_insert() -> FailedInsert {
    FailedInsert {
        path: "sql?mode=raw".to_string(),
        content_type: Some("application/json".to_string()),
        payload: r#"{"index": "test", "doc": {"col1": 1}}"#.to_string(),
        statements: vec!["INSERT INTO test(col1) VALUES(1)".to_string()],
        rejection: "table 'test' absent, or does not support INSERT".to_string(),
    }
}

#[tokio::test]
async fn recovery_creates_table_then_replays_insert() {
    let transport = Arc::new(MockTransport::new());
    let handler = RecoveryHandler::new(settings(), transport.clone());

    let result = handler.handle(failed_insert()).unwrap().wait().await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].0,
        "CREATE TABLE IF NOT EXISTS `test` (`col1` int)"
    );
    assert_eq!(calls[0].1, RequestTarget::sql_default());
    assert_eq!(calls[1].0, "INSERT INTO test(col1) VALUES(1)");
    assert_eq!(
        calls[1].1,
        RequestTarget::new("sql?mode=raw", Some("application/json"))
    );

    // The caller sees the decoded final response, untouched
    assert_eq!(
        result,
        serde_json::json!([{"total": 1, "error": "", "warning": ""}])
    );
}

#[tokio::test]
async fn multi_statement_batch_runs_in_order() {
    let transport = Arc::new(MockTransport::new());
    let handler = RecoveryHandler::new(settings(), transport.clone());

    let mut request = failed_insert();
    request.statements = vec![
        "INSERT INTO test(col1) VALUES(1)".to_string(),
        "INSERT INTO test(col1) VALUES(2)".to_string(),
    ];
    handler.handle(request).unwrap().wait().await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].0.starts_with("CREATE TABLE"));
    assert!(calls[1].0.ends_with("VALUES(1)"));
    assert!(calls[2].0.ends_with("VALUES(2)"));
    // Only the final statement carries the caller's wire target
    assert_eq!(calls[0].1, RequestTarget::sql_default());
    assert_eq!(calls[1].1, RequestTarget::sql_default());
    assert_eq!(calls[2].1.path, "sql?mode=raw");
}

#[tokio::test]
async fn disabled_feature_flag_fails_before_any_work() {
    let transport = Arc::new(MockTransport::new());
    let handler = RecoveryHandler::new(
        Settings {
            auto_schema: false,
            ..settings()
        },
        transport.clone(),
    );

    let err = handler.handle(failed_insert()).unwrap_err();
    assert!(matches!(err, CoreError::FeatureDisabled));
    assert!(err.is_retryable());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn plain_mode_fails_before_any_work() {
    let transport = Arc::new(MockTransport::new());
    let handler = RecoveryHandler::new(
        Settings {
            rt_mode: false,
            ..settings()
        },
        transport.clone(),
    );

    let err = handler.handle(failed_insert()).unwrap_err();
    assert!(matches!(err, CoreError::Configuration(_)));
    assert!(!err.is_retryable());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn empty_statement_list_is_a_contract_violation() {
    let transport = Arc::new(MockTransport::new());
    let handler = RecoveryHandler::new(settings(), transport.clone());

    let mut request = failed_insert();
    request.statements.clear();
    let err = handler.handle(request).unwrap_err();
    assert!(matches!(err, CoreError::InternalContract(_)));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn first_backend_failure_aborts_the_batch() {
    let transport = Arc::new(MockTransport::failing_on(0));
    let handler = RecoveryHandler::new(settings(), transport.clone());

    let err = handler
        .handle(failed_insert())
        .unwrap()
        .wait()
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Execution(_)));
    // The original insert was never issued after the create failed
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn insert_failure_leaves_created_table_in_place() {
    let transport = Arc::new(MockTransport::failing_on(1));
    let handler = RecoveryHandler::new(settings(), transport.clone());

    let err = handler
        .handle(failed_insert())
        .unwrap()
        .wait()
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Execution(_)));

    // No rollback: the create statement went out and stays effective
    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].0.starts_with("CREATE TABLE"));
}

#[tokio::test]
async fn malformed_document_fails_the_task() {
    let transport = Arc::new(MockTransport::new());
    let handler = RecoveryHandler::new(settings(), transport.clone());

    let mut request = failed_insert();
    request.payload = r#"{"doc": {"a": 1}}"#.to_string();
    let err = handler
        .handle(request)
        .unwrap()
        .wait()
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Parse(_)));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn malformed_backend_body_is_an_execution_error() {
    let transport = Arc::new(MockTransport::with_body("not json"));
    let handler = RecoveryHandler::new(settings(), transport.clone());

    let err = handler
        .handle(failed_insert())
        .unwrap()
        .wait()
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Execution(_)));
}

#[tokio::test]
async fn reinserting_the_created_shape_needs_no_second_recovery() {
    // A table created from the schema inferred from document D accepts a
    // re-insertion of D: the replayed insert is the last statement and the
    // mock backend accepts it, so exactly one recovery cycle runs.
    let transport = Arc::new(MockTransport::new());
    let handler = RecoveryHandler::new(settings(), transport.clone());

    handler
        .handle(failed_insert())
        .unwrap()
        .wait()
        .await
        .unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    let create = &calls[0].0;
    // Every column of the document appears in the created table
    assert!(create.contains("`col1` int"));
}
