//! At-most-once deferred link computation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::OnceCell;

use super::types::{LinkOutcome, ResolveError};

type LinkFuture = BoxFuture<'static, Result<LinkOutcome, ResolveError>>;
type LinkTask = Arc<dyn Fn() -> LinkFuture + Send + Sync>;

/// A link computation that runs only when first fetched.
///
/// Every clone shares the same state: the task runs to completion at most
/// once and later fetches observe the stored outcome. A fetch that is
/// dropped mid-flight leaves the computation unstarted.
#[derive(Clone)]
pub struct DeferredLinks {
    inner: Arc<Inner>,
}

struct Inner {
    task: LinkTask,
    outcome: OnceCell<Result<LinkOutcome, ResolveError>>,
}

impl DeferredLinks {
    pub fn new<F, Fut>(task: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LinkOutcome, ResolveError>> + Send + 'static,
    {
        let task: LinkTask = Arc::new(move || task().boxed());
        Self {
            inner: Arc::new(Inner {
                task,
                outcome: OnceCell::new(),
            }),
        }
    }

    /// Already-completed links, mostly for tests and adapters.
    pub fn ready(outcome: Result<LinkOutcome, ResolveError>) -> Self {
        let cell = OnceCell::new_with(Some(outcome));
        let task: LinkTask = Arc::new(|| {
            async { Err(ResolveError::Internal("completed".to_string())) }.boxed()
        });
        Self {
            inner: Arc::new(Inner {
                task,
                outcome: cell,
            }),
        }
    }

    /// Run the computation, or return its stored outcome.
    pub async fn fetch(&self) -> Result<LinkOutcome, ResolveError> {
        self.inner
            .outcome
            .get_or_init(|| (self.inner.task)())
            .await
            .clone()
    }

    /// Whether the computation has completed.
    pub fn is_complete(&self) -> bool {
        self.inner.outcome.initialized()
    }
}

impl fmt::Debug for DeferredLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredLinks")
            .field("complete", &self.is_complete())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting() -> (DeferredLinks, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let links = DeferredLinks::new(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(LinkOutcome::Links(vec![]))
            }
        });
        (links, runs)
    }

    #[tokio::test]
    async fn test_not_run_until_fetched() {
        let (links, runs) = counting();
        tokio::task::yield_now().await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(!links.is_complete());

        links.fetch().await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(links.is_complete());
    }

    #[tokio::test]
    async fn test_runs_at_most_once_across_clones() {
        let (links, runs) = counting();
        let other = links.clone();

        let (a, b) = tokio::join!(links.fetch(), other.fetch());
        assert_eq!(a, b);
        links.fetch().await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_is_stored() {
        let links = DeferredLinks::new(|| async { Err(ResolveError::NoLinks) });
        let err = tokio_test::assert_err!(links.fetch().await);
        assert_eq!(err, ResolveError::NoLinks);
        assert_eq!(links.fetch().await, Err(ResolveError::NoLinks));
    }

    #[test]
    fn test_fetch_outside_runtime_macro() {
        let (links, runs) = counting();
        let outcome = tokio_test::block_on(links.fetch());
        assert_eq!(tokio_test::assert_ok!(outcome), LinkOutcome::Links(vec![]));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ready() {
        let links = DeferredLinks::ready(Ok(LinkOutcome::Cancelled));
        assert!(links.is_complete());
        assert_eq!(links.fetch().await, Ok(LinkOutcome::Cancelled));
    }
}
