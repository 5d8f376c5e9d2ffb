//! Ordered fan-out/join over spawned tasks.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use super::BuildError;

/// Spawn one task per input and join them all.
///
/// Handles are kept in input order and awaited in input order, so slot `i`
/// of the result always belongs to input `i` no matter which task finished
/// first. Every task is awaited before an error is reported; the first
/// failing slot (by input position) wins.
///
/// With `permits`, each task holds a permit for its whole run. Tasks that
/// fan out again must not pass the same semaphore to the inner fan-out.
pub(crate) async fn fan_out<T, R, F, Fut>(
    permits: Option<Arc<Semaphore>>,
    inputs: impl IntoIterator<Item = T>,
    task: F,
) -> Result<Vec<R>, BuildError>
where
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, BuildError>> + Send + 'static,
{
    let handles: Vec<JoinHandle<Result<R, BuildError>>> = inputs
        .into_iter()
        .map(|input| {
            let work = task(input);
            let permits = permits.clone();
            tokio::spawn(async move {
                let _permit = match permits {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                work.await
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    let mut first_err = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(value)) => results.push(value),
            Ok(Err(e)) => {
                first_err.get_or_insert(e);
            }
            Err(e) => {
                first_err.get_or_insert(BuildError::Task(e));
            }
        }
    }

    match first_err {
        Some(e) => Err(e),
        None => Ok(results),
    }
}
