//! Download progress notification.
//!
//! Progress is a stream of cumulative byte totals pushed into a small bounded
//! channel. The producer never waits: when the channel is full, or nobody is
//! listening any more, the update is dropped. Consumers therefore see totals
//! that only ever increase but may skip values.

use tokio::sync::mpsc;

/// Capacity of the notification channel.
pub const PROGRESS_CAPACITY: usize = 10;

/// Receiving half handed to the caller.
pub type ProgressReceiver = mpsc::Receiver<u64>;

/// Sending half owned by a download stream.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: mpsc::Sender<u64>,
}

impl ProgressSink {
    /// Offer a new cumulative total. Never blocks.
    ///
    /// Returns `false` if the update was dropped.
    pub fn notify(&self, total: u64) -> bool {
        self.tx.try_send(total).is_ok()
    }
}

/// Create a connected sink/receiver pair.
///
/// # Example
/// ```
/// use megalink::progress::progress_channel;
///
/// let (sink, mut rx) = progress_channel();
/// assert!(sink.notify(512));
/// assert_eq!(rx.try_recv().unwrap(), 512);
/// ```
pub fn progress_channel() -> (ProgressSink, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(PROGRESS_CAPACITY);
    (ProgressSink { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_channel_drops_updates() {
        let (sink, mut rx) = progress_channel();
        for total in 1..=PROGRESS_CAPACITY as u64 {
            assert!(sink.notify(total));
        }
        assert!(!sink.notify(99));

        let mut seen = Vec::new();
        while let Ok(total) = rx.try_recv() {
            seen.push(total);
        }
        assert_eq!(seen, (1..=PROGRESS_CAPACITY as u64).collect::<Vec<_>>());

        // Space again after draining.
        assert!(sink.notify(100));
    }

    #[test]
    fn test_closed_receiver_does_not_fail() {
        let (sink, rx) = progress_channel();
        drop(rx);
        assert!(!sink.notify(1));
    }
}
