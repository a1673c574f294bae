//! Bounded FIFO of deferred work.
//!
//! Interrupt-context producers post immutable [`WorkItem`]s; the main loop
//! drains them in enqueue order. A full queue never drops silently: the
//! producer gets [`Error::QueueFull`] and the overflow is latched so the
//! next drain surfaces it to the loop as a fatal condition.

use heapless::Deque;

use crate::error::{Error, Result};
use crate::events::WorkItem;

/// Source of deferred work for the main loop.
pub trait WorkSource {
    /// Next pending item in FIFO order, `Ok(None)` once drained.
    fn next(&mut self) -> Result<Option<WorkItem>>;
}

pub struct WorkQueue<const N: usize> {
    items: Deque<WorkItem, N>,
    overflowed: bool,
}

impl<const N: usize> WorkQueue<N> {
    pub const fn new() -> Self {
        Self {
            items: Deque::new(),
            overflowed: false,
        }
    }

    /// Enqueue one item.
    pub fn post(&mut self, item: impl Into<WorkItem>) -> Result<()> {
        match self.items.push_back(item.into()) {
            Ok(()) => Ok(()),
            Err(_lost) => {
                error!("work queue full ({} items)", N);
                self.overflowed = true;
                Err(Error::QueueFull)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<const N: usize> Default for WorkQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> WorkSource for WorkQueue<N> {
    fn next(&mut self) -> Result<Option<WorkItem>> {
        if self.overflowed {
            return Err(Error::QueueFull);
        }
        Ok(self.items.pop_front())
    }
}
