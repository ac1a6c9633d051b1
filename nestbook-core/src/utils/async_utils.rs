//! Asynchronous Utilities.
//!
//! Thin wrappers around the `tokio` runtime used by the pipeline tasks:
//!
//! - [`spawn_task`]: launches a background task.
//! - [`timeout`]: bounds a future by a deadline.

use std::future::Future;
use std::time::Duration;
use tokio::task::{spawn, JoinHandle};
use tokio::time;

/// Spawns a new asynchronous task on the Tokio runtime.
///
/// # Examples
///
/// ```
/// use nestbook_core::utils::async_utils::spawn_task;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = spawn_task(async { "done".to_string() });
///     assert_eq!(handle.await.unwrap(), "done");
/// }
/// ```
pub fn spawn_task<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    spawn(future)
}

/// Executes a future with a specified timeout.
///
/// Returns `Ok(T)` when `future` completes within `duration`, otherwise
/// `Err(tokio::time::error::Elapsed)`. The future is dropped on timeout.
pub async fn timeout<F, T>(duration: Duration, future: F) -> Result<T, time::error::Elapsed>
where
    F: Future<Output = T>,
{
    time::timeout(duration, future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_task_returns_value() {
        let handle = spawn_task(async { 42 });
        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_completes_in_time() {
        let result = timeout(Duration::from_secs(1), async { "finished" }).await;
        assert_eq!(result.unwrap(), "finished");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_elapses() {
        let slow = async {
            time::sleep(Duration::from_secs(5)).await;
            "finished slowly"
        };
        assert!(timeout(Duration::from_millis(100), slow).await.is_err());
    }
}
