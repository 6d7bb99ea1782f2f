//! Blocking FIFO queue for handing values between threads.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::sync::{mutex_lock_or_recover, wait_timeout_while_or_recover, wait_while_or_recover};

/// Outcome of a blocking pop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopResult<T> {
    Item(T),
    TimedOut,
    Closed,
}

impl<T> PopResult<T> {
    pub fn into_item(self) -> Option<T> {
        match self {
            PopResult::Item(item) => Some(item),
            PopResult::TimedOut | PopResult::Closed => None,
        }
    }
}

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// An inter-thread queue.
///
/// Values already queued are still handed out after [`Queue::close`]; only
/// an empty closed queue reports [`PopResult::Closed`].
#[derive(Debug)]
pub struct Queue<T> {
    state: Mutex<State<T>>,
    available: Condvar,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append a value. A closed queue hands the value back.
    pub fn push(&self, value: T) -> Result<(), T> {
        {
            let mut state = mutex_lock_or_recover(&self.state);
            if state.closed {
                return Err(value);
            }
            state.items.push_back(value);
        }
        self.available.notify_one();
        Ok(())
    }

    /// Take the oldest value without blocking.
    pub fn try_pop(&self) -> Option<T> {
        mutex_lock_or_recover(&self.state).items.pop_front()
    }

    /// Block until a value arrives or the queue is closed.
    pub fn pop_wait(&self) -> PopResult<T> {
        let guard = mutex_lock_or_recover(&self.state);
        let mut state = wait_while_or_recover(&self.available, guard, |s| {
            s.closed || !s.items.is_empty()
        });
        match state.items.pop_front() {
            Some(item) => PopResult::Item(item),
            None => PopResult::Closed,
        }
    }

    /// Block for at most `timeout`.
    pub fn pop_wait_timeout(&self, timeout: Duration) -> PopResult<T> {
        let guard = mutex_lock_or_recover(&self.state);
        let (mut state, timed_out) =
            wait_timeout_while_or_recover(&self.available, guard, timeout, |s| {
                s.closed || !s.items.is_empty()
            });
        match state.items.pop_front() {
            Some(item) => PopResult::Item(item),
            None if timed_out && !state.closed => PopResult::TimedOut,
            None => PopResult::Closed,
        }
    }

    /// Refuse further pushes and wake every waiter.
    pub fn close(&self) {
        mutex_lock_or_recover(&self.state).closed = true;
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        mutex_lock_or_recover(&self.state).closed
    }

    pub fn len(&self) -> usize {
        mutex_lock_or_recover(&self.state).items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Drop for Queue<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = Queue::new();
        queue.push(313).unwrap();
        queue.push(314).unwrap();

        assert_eq!(queue.try_pop(), Some(313));
        assert_eq!(queue.try_pop(), Some(314));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_pop_wait_timeout_on_empty_queue() {
        let queue: Queue<i32> = Queue::new();
        assert_eq!(
            queue.pop_wait_timeout(Duration::from_millis(10)),
            PopResult::TimedOut
        );
    }

    #[test]
    fn test_close_wakes_waiter() {
        let queue: Arc<Queue<i32>> = Arc::new(Queue::new());
        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop_wait())
        };

        thread::sleep(Duration::from_millis(20));
        queue.close();

        assert_eq!(waiter.join().unwrap(), PopResult::Closed);
    }

    #[test]
    fn test_closed_queue_still_drains() {
        let queue = Queue::new();
        queue.push("a").unwrap();
        queue.close();

        assert_eq!(queue.push("b"), Err("b"));
        assert_eq!(queue.pop_wait(), PopResult::Item("a"));
        assert_eq!(queue.pop_wait(), PopResult::Closed);
        assert!(queue.is_closed());
    }

    #[test]
    fn test_producer_consumer() {
        let queue = Arc::new(Queue::new());
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..100 {
                    queue.push(i).unwrap();
                }
                queue.close();
            })
        };

        let mut received = Vec::new();
        while let Some(item) = queue.pop_wait().into_item() {
            received.push(item);
        }
        producer.join().unwrap();

        assert_eq!(received, (0..100).collect::<Vec<_>>());
        assert!(queue.is_empty());
    }
}
