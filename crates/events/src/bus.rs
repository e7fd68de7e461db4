//! Event publishing/subscription abstraction (mechanics only).
//!
//! The ledger publishes each committed transition to a bus so that read models
//! (escrow balances, availability views) can follow along without touching
//! ledger state.
//!
//! - **Transport-agnostic**: in-memory channels today, a broker later.
//! - **Broadcast**: every subscription gets a copy of every published message.
//! - **No persistence**: a subscriber that attaches late misses earlier messages.
//!
//! Consumers must be idempotent; redelivery is allowed.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Receiving end of a bus subscription.
///
/// ```ignore
/// let subscription = ledger.bus().subscribe();
/// while let Some(envelope) = subscription.wait_for(Duration::from_secs(1)) {
///     projection.apply_envelope(&envelope)?;
/// }
/// ```
///
/// Envelopes for one room arrive in sequence order, because the ledger
/// publishes while it still holds that room's lock. Envelopes for different
/// rooms may interleave. Intended for one consuming thread.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message. `None` once the bus is gone.
    pub fn wait(&self) -> Option<M> {
        self.receiver.recv().ok()
    }

    /// Wait up to `timeout` for the next message.
    pub fn wait_for(&self, timeout: Duration) -> Option<M> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Everything already delivered, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Pub/sub event bus.
///
/// `publish()` may fail, for example on a closed transport. The ledger
/// publishes only after a transition has committed, so a failed publish never
/// undoes state.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
