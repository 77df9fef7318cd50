use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::model::ControlEvent;

/// Fan-out of [`ControlEvent`]s to every subscriber.
///
/// Subscribers whose receiver has been dropped are pruned on the next
/// broadcast.
#[derive(Clone, Default, Debug)]
pub struct ControlEventBus {
    subscribers: Arc<Mutex<Vec<Sender<ControlEvent>>>>,
}

impl ControlEventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> Receiver<ControlEvent> {
        let (tx, rx) = unbounded::<ControlEvent>();
        self.subscribers().push(tx);
        rx
    }

    /// Sends `event` to every live subscriber, in subscription order.
    pub fn broadcast(&self, event: ControlEvent) {
        self.subscribers().retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }

    // Un abonné qui a paniqué ne doit pas couper la publication.
    fn subscribers(&self) -> MutexGuard<'_, Vec<Sender<ControlEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
