//! Producer/consumer queue between asynchronous producers and the tick
//! thread.
//!
//! Producers (an input tracker, an external sensor feed) push from their
//! own threads; the tick thread drains the whole queue once per tick,
//! in order. No other shared state crosses the thread boundary.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Consumer end, owned by the tick thread.
pub struct TickFeed<T> {
    queue: Arc<Mutex<VecDeque<T>>>,
}

/// Producer handle, cloneable across threads.
pub struct FeedProducer<T> {
    queue: Arc<Mutex<VecDeque<T>>>,
}

impl<T> Clone for FeedProducer<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<T> Default for TickFeed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TickFeed<T> {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a producer handle for another thread.
    pub fn producer(&self) -> FeedProducer<T> {
        FeedProducer {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Drain every queued item, in arrival order. Called once per tick.
    ///
    /// A poisoned lock is recovered: queued items are plain data and the
    /// tick thread must keep running.
    pub fn drain(&self) -> Vec<T> {
        let mut queue = self
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        queue.drain(..).collect()
    }
}

impl<T> FeedProducer<T> {
    /// Queue one item for the next tick.
    pub fn push(&self, item: T) {
        let mut queue = self
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        queue.push_back(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn drain_preserves_order() {
        let feed = TickFeed::new();
        let producer = feed.producer();

        producer.push(1);
        producer.push(2);
        producer.push(3);

        assert_eq!(feed.drain(), vec![1, 2, 3]);
        assert!(feed.drain().is_empty());
    }

    #[test]
    fn producers_push_from_other_threads() {
        let feed = TickFeed::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let producer = feed.producer();
                thread::spawn(move || {
                    for j in 0..25 {
                        producer.push(i * 100 + j);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let mut drained = Vec::new();
        drained.extend(feed.drain());
        assert_eq!(drained.len(), 100);
    }

    #[test]
    fn items_pushed_after_drain_arrive_next_tick() {
        let feed = TickFeed::new();
        let producer = feed.producer();

        producer.push("a");
        assert_eq!(feed.drain(), vec!["a"]);

        producer.push("b");
        assert_eq!(feed.drain(), vec!["b"]);
    }
}
