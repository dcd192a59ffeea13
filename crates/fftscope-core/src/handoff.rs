//! Hand-off queues between the delivery context and the render loop
//!
//! A queue is an unbounded multi-producer/single-consumer FIFO. Producers push
//! from any thread without taking a lock the consumer holds; the consumer pops
//! whatever is available and never waits for more.

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};

/// The consuming side of the queue was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("hand-off queue consumer has been dropped")]
pub struct QueueClosed;

/// Create a new hand-off queue, returning its producer and consumer halves
pub fn channel<T>() -> (Producer<T>, HandoffQueue<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Producer { tx }, HandoffQueue { rx })
}

/// Cloneable producer half, safe to share between delivery threads
#[derive(Debug)]
pub struct Producer<T> {
    tx: UnboundedSender<T>,
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Producer<T> {
    /// Enqueue an item. Never blocks.
    pub fn push(&self, item: T) -> Result<(), QueueClosed> {
        self.tx.send(item).map_err(|_| QueueClosed)
    }
}

/// Single consumer half
#[derive(Debug)]
pub struct HandoffQueue<T> {
    rx: UnboundedReceiver<T>,
}

impl<T> HandoffQueue<T> {
    /// Pop the oldest item if one is available
    pub fn try_pop(&mut self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Iterate over every item available right now, oldest first.
    ///
    /// The iterator ends as soon as the queue reports empty, so items pushed
    /// concurrently may or may not be included; they are never lost.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain { queue: self }
    }
}

/// Draining iterator returned by [`HandoffQueue::drain`]
pub struct Drain<'a, T> {
    queue: &'a mut HandoffQueue<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.try_pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_empty_queue() {
        let (_tx, mut rx) = channel::<u32>();
        assert_eq!(rx.try_pop(), None);
        assert_eq!(rx.drain().count(), 0);
    }

    #[test]
    fn test_fifo_order() {
        let (tx, mut rx) = channel();
        for i in 0..10 {
            tx.push(i).unwrap();
        }
        let drained: Vec<_> = rx.drain().collect();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
        assert_eq!(rx.try_pop(), None);
    }

    #[test]
    fn test_push_after_consumer_dropped() {
        let (tx, rx) = channel();
        drop(rx);
        assert_eq!(tx.push(1), Err(QueueClosed));
    }

    #[test]
    fn test_drain_after_producers_dropped_keeps_items() {
        let (tx, mut rx) = channel();
        tx.push("a").unwrap();
        tx.push("b").unwrap();
        drop(tx);

        assert_eq!(rx.drain().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(rx.try_pop(), None);
    }

    #[test]
    fn test_concurrent_producers_lose_nothing() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: usize = 1_000;

        let (tx, mut rx) = channel();
        let handles: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for i in 0..PER_PRODUCER {
                        tx.push((p, i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let drained: Vec<_> = rx.drain().collect();
        assert_eq!(drained.len(), PRODUCERS * PER_PRODUCER);

        // Per-producer order is preserved
        for p in 0..PRODUCERS {
            let seq: Vec<_> = drained
                .iter()
                .filter(|(producer, _)| *producer == p)
                .map(|(_, i)| *i)
                .collect();
            assert_eq!(seq, (0..PER_PRODUCER).collect::<Vec<_>>());
        }
    }
}
