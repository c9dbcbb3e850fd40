//! Live projections of the shared room.
//!
//! A [`LiveView`] drains a backend [`Subscription`] on its own task and
//! publishes a projection of every snapshot on a `watch` channel. Dropping
//! the view aborts the task, which drops the subscription and unsubscribes.

pub mod countdown;
pub mod events;
pub mod messages;
pub mod moments;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use heartsync_backend::Subscription;

pub use countdown::CountdownTicker;
pub use events::EventListView;
pub use messages::MessageListView;
pub use moments::MomentCalendarView;

pub struct LiveView<R> {
    current: watch::Receiver<R>,
    task: JoinHandle<()>,
}

impl<R> LiveView<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Start projecting `subscription` through `project`, showing `initial`
    /// until the first snapshot arrives.
    pub fn spawn<T, F>(mut subscription: Subscription<T>, initial: R, mut project: F) -> Self
    where
        T: Send + 'static,
        F: FnMut(Vec<T>) -> R + Send + 'static,
    {
        let (tx, rx) = watch::channel(initial);
        let task = tokio::spawn(async move {
            while let Some(snapshot) = subscription.next_snapshot().await {
                if tx.send(project(snapshot)).is_err() {
                    break;
                }
            }
            tracing::debug!("Live view source closed");
        });

        Self { current: rx, task }
    }

    /// The latest projection.
    pub fn current(&self) -> R {
        self.current.borrow().clone()
    }

    /// Wait for the next projection. `None` once the source has closed.
    pub async fn changed(&mut self) -> Option<R> {
        self.current.changed().await.ok()?;
        Some(self.current.borrow_and_update().clone())
    }

    /// A receiver for rendering elsewhere. It stops updating when the view
    /// is dropped.
    pub fn watch(&self) -> watch::Receiver<R> {
        self.current.clone()
    }
}

impl<R> Drop for LiveView<R> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn projects_each_snapshot() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut view = LiveView::spawn(Subscription::new(rx, || {}), 0usize, |s: Vec<u8>| s.len());
        assert_eq!(view.current(), 0);

        tx.send(vec![1, 2]).unwrap();
        assert_eq!(view.changed().await, Some(2));

        drop(tx);
        assert_eq!(view.changed().await, None);
    }

    #[tokio::test]
    async fn drop_unsubscribes() {
        let (tx, rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        let view = LiveView::spawn(
            Subscription::new(rx, move || {
                let _ = done_tx.send(());
            }),
            (),
            |_| (),
        );

        drop(view);
        done_rx.await.unwrap();
        assert!(tx.send(vec![1]).is_err());
    }
}
