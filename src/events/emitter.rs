use std::sync::Mutex;

use event_emitter_rs::EventEmitter;
use tracing::{debug, warn};

use super::{EventData, EventSink, Notification, RankingEvent};

/// Publishes notifications as JSON strings through an `EventEmitter`, on the
/// channel named by [`RankingEvent::name`].
///
/// # Example
///
/// ```ignore
/// let mut emitter = EventEmitter::new();
/// emitter.on("ranking:created", |json: String| println!("{}", json));
/// let sink = EmitterSink::new(emitter);
/// ```
pub struct EmitterSink {
    emitter: Mutex<EventEmitter>,
}

impl EmitterSink {
    pub fn new(emitter: EventEmitter) -> Self {
        EmitterSink {
            emitter: Mutex::new(emitter),
        }
    }

    /// Register a listener receiving the JSON form of a [`Notification`].
    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        if let Ok(mut emitter) = self.emitter.lock() {
            emitter.on(event, listener);
        }
    }
}

impl EventSink for EmitterSink {
    fn notify(&self, event: &RankingEvent, source: &str, data: &EventData) {
        let notification = Notification {
            event: event.clone(),
            source: source.to_string(),
            data: data.clone(),
        };
        let payload = match serde_json::to_string(&notification) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(event = event.name(), error = %err, "could not serialize ranking notification");
                return;
            }
        };

        match self.emitter.lock() {
            Ok(mut emitter) => {
                debug!(event = event.name(), source, "emitting ranking notification");
                let _ = emitter.emit(event.name(), payload);
            }
            Err(_) => warn!(event = event.name(), "ranking event emitter poisoned"),
        }
    }
}
