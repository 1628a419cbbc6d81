//! Bounded event queue with drop-oldest backpressure
//!
//! The producer never blocks. When the queue is full the oldest entry is
//! evicted to make room, so under overload the consumer sees the most recent
//! gestures in their original order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::debug;

/// Producer half of the queue
///
/// Holds a receiver clone purely to evict from the head on overflow.
#[derive(Debug)]
pub struct QueueSender<T> {
    tx: Sender<T>,
    evict: Receiver<T>,
    dropped: Arc<AtomicU64>,
}

/// Create a queue holding at most `capacity` entries (minimum 1)
pub fn event_queue<T>(capacity: usize) -> (QueueSender<T>, Receiver<T>) {
    let (tx, rx) = bounded(capacity.max(1));
    let sender = QueueSender {
        tx,
        evict: rx.clone(),
        dropped: Arc::new(AtomicU64::new(0)),
    };
    (sender, rx)
}

impl<T> QueueSender<T> {
    /// Enqueue `item`, evicting the oldest entry if full
    pub fn push(&self, mut item: T) {
        loop {
            match self.tx.try_send(item) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    if self.evict.try_recv().is_ok() {
                        let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                        debug!("event queue full, dropped oldest entry ({total} total)");
                    }
                    item = back;
                }
                // `evict` keeps the channel open, so this never happens
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// Entries evicted since creation
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            evict: self.evict.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_below_capacity() {
        let (tx, rx) = event_queue(4);
        for i in 0..3 {
            tx.push(i);
        }
        let got: Vec<i32> = rx.try_iter().collect();
        assert_eq!(got, [0, 1, 2]);
        assert_eq!(tx.dropped(), 0);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let (tx, rx) = event_queue(3);
        for i in 0..5 {
            tx.push(i);
        }
        assert_eq!(tx.len(), 3);
        assert_eq!(tx.dropped(), 2);
        let got: Vec<i32> = rx.try_iter().collect();
        assert_eq!(got, [2, 3, 4]);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let (tx, rx) = event_queue(0);
        tx.push('a');
        tx.push('b');
        assert_eq!(rx.try_recv(), Ok('b'));
    }

    #[test]
    fn test_push_never_blocks_without_consumer() {
        let (tx, rx) = event_queue::<u8>(2);
        drop(rx);
        for i in 0..10 {
            tx.push(i);
        }
        assert_eq!(tx.len(), 2);
        assert_eq!(tx.dropped(), 8);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn keeps_newest_in_order(capacity in 1usize..32, count in 0usize..128) {
                let (tx, rx) = event_queue(capacity);
                for i in 0..count {
                    tx.push(i);
                }
                let got: Vec<usize> = rx.try_iter().collect();
                let start = count.saturating_sub(capacity);
                let expected: Vec<usize> = (start..count).collect();
                prop_assert_eq!(got, expected);
                prop_assert_eq!(tx.dropped() as usize, start);
            }
        }
    }
}
