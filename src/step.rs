use futures::future::{BoxFuture, FutureExt};
use std::future::Future;

/// The unit of work every hook returns: either an immediate result or a
/// suspended computation.
///
/// The engine awaits suspended steps at the exact chain position that produced
/// them, so mixing sync and async hooks never reorders a chain.
pub enum Step<'a, T> {
    Ready(T),
    Suspended(BoxFuture<'a, T>),
}

impl<'a, T> Step<'a, T> {
    pub fn ready(value: T) -> Self {
        Step::Ready(value)
    }

    pub fn suspend<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'a,
    {
        Step::Suspended(future.boxed())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Step::Ready(_))
    }

    /// Drives the step to completion.
    pub async fn complete(self) -> T {
        match self {
            Step::Ready(value) => value,
            Step::Suspended(future) => future.await,
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Step<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Step::Suspended(_) => f.write_str("Suspended(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_and_suspended_complete_alike() {
        let ready: Step<'_, i32> = Step::ready(1);
        assert!(ready.is_ready());
        assert_eq!(tokio_test::block_on(ready.complete()), 1);

        let suspended = Step::suspend(async { 2 });
        assert!(!suspended.is_ready());
        assert_eq!(tokio_test::block_on(suspended.complete()), 2);
    }
}
