//! In-memory event bus for tests/dev and single-process deployments.

use std::sync::{Mutex, MutexGuard, PoisonError, mpsc};

use crate::bus::{EventBus, Subscription};

#[derive(Debug, PartialEq, Eq)]
pub enum InMemoryBusError {
    /// The bus was closed; nothing published after that is delivered.
    Closed,
}

#[derive(Debug)]
struct Fanout<M> {
    senders: Vec<mpsc::Sender<M>>,
    published: u64,
    closed: bool,
}

/// In-memory pub/sub bus.
///
/// Fan-out runs synchronously inside `publish`, so a message is in every live
/// subscription's queue before `publish` returns. Dropped subscriptions are
/// pruned on the next publish.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    fanout: Mutex<Fanout<M>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.fanout().senders.len()
    }

    /// Messages accepted so far.
    pub fn published_count(&self) -> u64 {
        self.fanout().published
    }

    /// Stop accepting messages and disconnect every subscription.
    pub fn close(&self) {
        let mut fanout = self.fanout();
        fanout.closed = true;
        fanout.senders.clear();
    }

    // Fan-out state is a plain list and a counter; a panicking holder cannot
    // leave it inconsistent.
    fn fanout(&self) -> MutexGuard<'_, Fanout<M>> {
        self.fanout.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            fanout: Mutex::new(Fanout {
                senders: Vec::new(),
                published: 0,
                closed: false,
            }),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut fanout = self.fanout();
        if fanout.closed {
            return Err(InMemoryBusError::Closed);
        }
        fanout.senders.retain(|tx| tx.send(message.clone()).is_ok());
        fanout.published += 1;
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        let mut fanout = self.fanout();
        // A closed bus hands out a subscription that is already disconnected.
        if !fanout.closed {
            fanout.senders.push(tx);
        }
        Subscription::new(rx)
    }
}
