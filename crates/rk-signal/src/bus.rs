//! SignalBus — Fire-and-forget fan-out of signal events
//!
//! Every subscriber gets its own unbounded channel, so emitting never
//! blocks the tick loop. Subscribers that dropped their receiver are pruned
//! on the next emit.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::event::SignalEvent;

/// Cloneable handle to a shared set of subscribers
#[derive(Debug, Clone, Default)]
pub struct SignalBus {
    subscribers: Arc<Mutex<Vec<Sender<SignalEvent>>>>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. Only events emitted after this call are
    /// delivered to it.
    pub fn subscribe(&self) -> Receiver<SignalEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver to every live subscriber
    pub fn emit(&self, event: SignalEvent) {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        let pruned = before - subscribers.len();
        if pruned > 0 {
            log::trace!("Pruned {} disconnected signal subscriber(s)", pruned);
        }
    }

    /// Number of live subscribers (as of the last emit)
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
