//! Realtime snapshot subscriptions.
//!
//! The store pushes the full, current contents of a collection on every
//! change. A [`Subscription`] owns the receiving end and the cancellation
//! hook; dropping it unsubscribes.

use tokio::sync::mpsc;

type Cancel = Box<dyn FnOnce() + Send>;

pub struct Subscription<T> {
    snapshots: mpsc::UnboundedReceiver<Vec<T>>,
    cancel: Option<Cancel>,
}

impl<T> Subscription<T> {
    /// Wrap a snapshot channel. `cancel` runs exactly once, on
    /// [`unsubscribe`](Self::unsubscribe) or drop.
    pub fn new(
        snapshots: mpsc::UnboundedReceiver<Vec<T>>,
        cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            snapshots,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Wait for the next snapshot. `None` once the source has gone away.
    pub async fn next_snapshot(&mut self) -> Option<Vec<T>> {
        self.snapshots.recv().await
    }

    /// The most recent snapshot already delivered, skipping older ones.
    pub fn try_latest(&mut self) -> Option<Vec<T>> {
        let mut latest = None;
        while let Ok(snapshot) = self.snapshots.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
        self.snapshots.close();
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn delivers_snapshots_in_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = Subscription::new(rx, || {});

        tx.send(vec![1]).unwrap();
        tx.send(vec![1, 2]).unwrap();

        assert_eq!(sub.next_snapshot().await, Some(vec![1]));
        assert_eq!(sub.next_snapshot().await, Some(vec![1, 2]));

        drop(tx);
        assert_eq!(sub.next_snapshot().await, None);
    }

    #[test]
    fn try_latest_skips_stale_snapshots() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = Subscription::new(rx, || {});
        tx.send(vec!["a"]).unwrap();
        tx.send(vec!["a", "b"]).unwrap();

        assert_eq!(sub.try_latest(), Some(vec!["a", "b"]));
        assert_eq!(sub.try_latest(), None);
    }

    #[test]
    fn cancel_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let (_tx, rx) = mpsc::unbounded_channel::<Vec<u8>>();

        let sub = Subscription::new(rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sub.unsubscribe();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_cancels() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let (tx, rx) = mpsc::unbounded_channel::<Vec<u8>>();

        {
            let _sub = Subscription::new(rx, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(tx.send(vec![1]).is_err());
    }
}
