//! Background task spawning

use std::future::Future;
use tokio::task::JoinHandle;
use tracing::error;

/// Spawn `future` and log it if it panics or is cancelled.
///
/// The returned handle resolves to `None` in that case. Callers that only
/// fire and forget may drop it.
pub fn spawn_supervised<F>(task: &'static str, future: F) -> JoinHandle<Option<F::Output>>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let inner = tokio::spawn(future);
    tokio::spawn(async move {
        match inner.await {
            Ok(output) => Some(output),
            Err(e) => {
                error!(task, error = %e, "Background task failed");
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_output_is_passed_through() {
        let handle = spawn_supervised("answer", async { 42 });
        assert_eq!(handle.await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let handle = spawn_supervised("explode", async {
            if true {
                panic!("boom");
            }
            1
        });
        assert_eq!(handle.await.unwrap(), None);
    }
}
