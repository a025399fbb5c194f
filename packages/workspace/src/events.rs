use crate::watcher::WatchEvent;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Batches watcher notifications.
///
/// Editors tend to emit several events for one save (truncate, write,
/// rename). After the first event of a burst the queue waits out the
/// debounce window, drains what else arrived, and hands back each path once
/// in first-seen order.
pub struct EventQueue {
    rx: mpsc::Receiver<WatchEvent>,
    debounce: Duration,
}

impl EventQueue {
    pub fn new(rx: mpsc::Receiver<WatchEvent>, debounce: Duration) -> Self {
        Self { rx, debounce }
    }

    /// Next batch of distinct events, or `None` once every sender is gone.
    pub async fn next_batch(&mut self) -> Option<Vec<WatchEvent>> {
        let first = self.rx.recv().await?;
        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }

        let mut batch = vec![first];
        while let Ok(event) = self.rx.try_recv() {
            batch.push(event);
        }

        let mut seen = HashSet::new();
        batch.retain(|event| seen.insert(event.clone()));
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_is_coalesced_in_order() {
        let (tx, rx) = mpsc::channel(16);
        let mut queue = EventQueue::new(rx, Duration::from_millis(20));

        tx.send(WatchEvent::file("/r/resume.html")).await.unwrap();
        tx.send(WatchEvent::file("/r/a/resume.html")).await.unwrap();
        tx.send(WatchEvent::file("/r/resume.html")).await.unwrap();

        let batch = queue.next_batch().await.unwrap();
        assert_eq!(
            batch,
            vec![
                WatchEvent::file("/r/resume.html"),
                WatchEvent::file("/r/a/resume.html"),
            ]
        );
    }

    #[tokio::test]
    async fn test_closed_channel_ends_queue() {
        let (tx, rx) = mpsc::channel(4);
        let mut queue = EventQueue::new(rx, Duration::ZERO);

        tx.send(WatchEvent::file("/r/resume.html")).await.unwrap();
        drop(tx);

        assert_eq!(queue.next_batch().await.map(|b| b.len()), Some(1));
        assert!(queue.next_batch().await.is_none());
    }
}
