use std::sync::{Arc, Mutex};

use tracing::warn;

use super::{EventData, EventSink, Notification, RankingEvent};
use crate::lock::LockError;

/// Keeps every notification in memory, in delivery order.
///
/// Clone-friendly via Arc: clones share the same buffer.
#[derive(Clone, Default)]
pub struct RecordingSink {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the notifications received so far.
    pub fn notifications(&self) -> Result<Vec<Notification>, LockError> {
        let notifications = self
            .notifications
            .lock()
            .map_err(|_| LockError::Poisoned("recorded notifications poisoned".into()))?;
        Ok(notifications.clone())
    }

    /// Events received so far, without their data.
    pub fn events(&self) -> Result<Vec<RankingEvent>, LockError> {
        Ok(self
            .notifications()?
            .into_iter()
            .map(|notification| notification.event)
            .collect())
    }

    /// Remove and return the notifications received so far.
    pub fn take(&self) -> Result<Vec<Notification>, LockError> {
        let mut notifications = self
            .notifications
            .lock()
            .map_err(|_| LockError::Poisoned("recorded notifications poisoned".into()))?;
        Ok(std::mem::take(&mut *notifications))
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: &RankingEvent, source: &str, data: &EventData) {
        match self.notifications.lock() {
            Ok(mut notifications) => notifications.push(Notification {
                event: event.clone(),
                source: source.to_string(),
                data: data.clone(),
            }),
            Err(_) => warn!(event = event.name(), source, "dropping notification, recording sink poisoned"),
        }
    }
}
