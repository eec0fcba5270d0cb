//! Status subscription handle returned by the transport

use super::status::SubmittableResult;
use crate::error::TransportError;

use futures::stream::{BoxStream, Stream, StreamExt};
use std::fmt;

/// Status updates for one extrinsic, in transport delivery order
pub type StatusStream = BoxStream<'static, Result<SubmittableResult, TransportError>>;

/// Watch on a submitted extrinsic.
///
/// The unsubscribe handle runs at most once: either on [`release`] or when
/// the subscription is dropped unreleased. A released subscription yields
/// no further updates.
///
/// [`release`]: StatusSubscription::release
pub struct StatusSubscription {
    updates: StatusStream,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl StatusSubscription {
    pub fn new<S, F>(updates: S, unsubscribe: F) -> Self
    where
        S: Stream<Item = Result<SubmittableResult, TransportError>> + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        Self {
            updates: updates.boxed(),
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Next update, or `None` once the stream ended or was released
    pub async fn next(&mut self) -> Option<Result<SubmittableResult, TransportError>> {
        if self.unsubscribe.is_none() {
            return None;
        }
        self.updates.next().await
    }

    /// Unsubscribe from the transport. Returns false if already released.
    pub fn release(&mut self) -> bool {
        match self.unsubscribe.take() {
            Some(unsubscribe) => {
                unsubscribe();
                true
            }
            None => false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.unsubscribe.is_none()
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for StatusSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusSubscription")
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::TxStatus;

    use primitive_types::H256;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_subscription(
        updates: Vec<Result<SubmittableResult, TransportError>>,
    ) -> (StatusSubscription, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sub = StatusSubscription::new(futures::stream::iter(updates), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (sub, calls)
    }

    #[tokio::test]
    async fn test_release_runs_unsubscribe_once() {
        let (mut sub, calls) = counting_subscription(vec![]);

        assert!(sub.release());
        assert!(!sub.release());
        drop(sub);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_drop_releases_unreleased_subscription() {
        let (sub, calls) = counting_subscription(vec![]);
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_released_subscription_yields_nothing() {
        let update = SubmittableResult::new(TxStatus::Ready, H256::zero());
        let (mut sub, _calls) = counting_subscription(vec![Ok(update.clone()), Ok(update)]);

        assert!(sub.next().await.is_some());
        sub.release();
        assert!(sub.next().await.is_none());
    }
}
