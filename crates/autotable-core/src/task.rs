//! Background task primitive
//!
//! A recovery runs as one unit of work on the runtime. The handle exposes a
//! terminal join and a completion poll. Cancellation is not supported; once
//! started, a recovery runs to completion or failure.

use crate::error::{CoreError, Result};
use std::future::Future;

/// Handle to a spawned recovery task
#[derive(Debug)]
pub struct TaskHandle<T> {
    inner: tokio::task::JoinHandle<Result<T>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Spawn a unit of work on the runtime
    pub fn spawn<F>(work: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: tokio::spawn(work),
        }
    }

    /// True once the task has reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Await the terminal result, consuming the handle
    pub async fn wait(self) -> Result<T> {
        match self.inner.await {
            Ok(result) => result,
            // A panic inside the task is a programming error, not a backend
            // or user failure
            Err(join_err) => Err(CoreError::internal(format!(
                "recovery task aborted: {}",
                join_err
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_returns_task_result() {
        let handle = TaskHandle::spawn(async { Ok(21 * 2) });
        assert_eq!(handle.wait().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_wait_propagates_task_error() {
        let handle: TaskHandle<()> =
            TaskHandle::spawn(async { Err(CoreError::execution("rejected")) });
        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, CoreError::Execution(_)));
    }

    #[tokio::test]
    async fn test_is_finished_after_completion() {
        let handle = TaskHandle::spawn(async { Ok(()) });
        // Let the runtime drive the task to completion
        tokio::task::yield_now().await;
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
        assert!(handle.is_finished());
        handle.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_panic_maps_to_internal_error() {
        let handle: TaskHandle<()> = TaskHandle::spawn(async { panic!("boom") });
        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, CoreError::InternalContract(_)));
    }
}
