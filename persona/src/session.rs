//! Async driver that connects a [`Controller`] to a [`Completer`].
//!
//! Each generation runs as its own task holding only a weak reference to
//! the session state. Once the session is disposed the task's result has
//! nowhere to go and is dropped without touching anything.

use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::controller::{Controller, ControllerError, Request, Resolution, Slot, Snapshot};
use crate::events::{Event, EventBus};
use crate::gateway::{Completer, GenerationError};
use crate::prompt::Exchange;

/// Receives generation failures.
pub trait ErrorSink: Send + Sync {
    fn report(&self, slot: Slot, error: &GenerationError);
}

/// [`ErrorSink`] that logs through `tracing`.
#[derive(Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, slot: Slot, error: &GenerationError) {
        error!(?slot, %error, "generation failed");
    }
}

/// One persona chat session.
pub struct Session {
    state: Arc<Mutex<Controller>>,
    gateway: Arc<dyn Completer>,
    sink: Arc<dyn ErrorSink>,
    events: EventBus,
}

impl Session {
    /// Create a session that reports failures through [`TracingSink`].
    pub fn new(gateway: Arc<dyn Completer>) -> Self {
        Self::with_sink(gateway, Arc::new(TracingSink))
    }

    pub fn with_sink(gateway: Arc<dyn Completer>, sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            state: Arc::new(Mutex::new(Controller::new())),
            gateway,
            sink,
            events: EventBus::default(),
        }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Choose the persona and start generating its description.
    ///
    /// The returned handle completes once the result has been applied or
    /// discarded.
    pub async fn submit_persona(
        &self,
        name: &str,
        details: &str,
    ) -> Result<JoinHandle<()>, ControllerError> {
        let req = self.state.lock().await.submit_persona(name, details)?;
        info!(name, "persona chosen");
        Ok(self.dispatch(req))
    }

    /// Say `text` to the persona and start generating its reply.
    pub async fn say(&self, text: &str) -> Result<JoinHandle<()>, ControllerError> {
        let req = self.state.lock().await.submit_human(text)?;
        self.events.send(Event::HumanSaid(text.to_string()));
        Ok(self.dispatch(req))
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn input_disabled(&self) -> bool {
        self.state.lock().await.input_disabled()
    }

    pub async fn description_exchange(&self) -> Option<Exchange> {
        self.state.lock().await.description_exchange()
    }

    pub async fn last_exchange(&self) -> Option<Exchange> {
        self.state.lock().await.last_exchange()
    }

    /// Tear the session down. In-flight generations are left to finish and
    /// their results are ignored.
    pub fn dispose(self) {
        debug!("session disposed");
    }

    fn dispatch(&self, req: Request) -> JoinHandle<()> {
        let state = Arc::downgrade(&self.state);
        let gateway = self.gateway.clone();
        let sink = self.sink.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = gateway.complete(&req.prompt).await;
            deliver(state, req, outcome, sink.as_ref(), &events).await;
        })
    }
}

async fn deliver(
    state: Weak<Mutex<Controller>>,
    req: Request,
    outcome: Result<String, GenerationError>,
    sink: &dyn ErrorSink,
    events: &EventBus,
) {
    let Some(state) = state.upgrade() else {
        debug!(slot = ?req.ticket.slot(), "session gone, discarding result");
        return;
    };
    let resolution = state.lock().await.resolve(req.ticket, outcome);
    match resolution {
        Resolution::Applied {
            slot: Slot::Description,
            text,
        } => events.send(Event::DescriptionReady(text)),
        Resolution::Applied {
            slot: Slot::Reply,
            text,
        } => events.send(Event::PersonaSaid(text)),
        Resolution::Failed { slot, error } => {
            sink.report(slot, &error);
            events.send(Event::GenerationFailed {
                slot,
                error: error.to_string(),
            });
        }
        Resolution::Stale => debug!(slot = ?req.ticket.slot(), "stale result ignored"),
    }
}
