use tokio::sync::broadcast;

use crate::controller::Slot;

/// Events emitted by a [`Session`](crate::Session).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The persona's description was generated.
    DescriptionReady(String),
    /// A human turn was appended.
    HumanSaid(String),
    /// A persona turn was appended.
    PersonaSaid(String),
    /// A generation request failed; nothing was appended.
    GenerationFailed { slot: Slot, error: String },
}

/// Simple broadcast bus for sending [`Event`]s to multiple listeners.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Obtain a receiver subscribed to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Broadcast an event to all subscribers. Errors are ignored.
    pub fn send(&self, evt: Event) {
        let _ = self.sender.send(evt);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
