//! Notifications sent by ranking managers after each successful commit.
//!
//! Every notification carries the manager identifier as its source and the
//! affected record as its data. Sinks are invoked synchronously by the
//! manager, in commit order.

#[cfg(feature = "emitter")]
mod emitter;
mod recording;

use serde::{Deserialize, Serialize};

use crate::ranking::{AverageRank, Ranking};

/// What happened to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RankingEvent {
    /// A first vote was stored for a voter and a target.
    Created,
    /// An existing vote changed; carries the previous rank.
    Updated { old_rank: u32 },
    /// A vote was removed.
    Deleted,
    /// An average rank changed; carries the values before the change.
    AverageUpdated { old_average: f64, old_count: u64 },
}

impl RankingEvent {
    /// Stable name used to route the event, e.g. as an emitter channel.
    pub fn name(&self) -> &'static str {
        match self {
            RankingEvent::Created => "ranking:created",
            RankingEvent::Updated { .. } => "ranking:updated",
            RankingEvent::Deleted => "ranking:deleted",
            RankingEvent::AverageUpdated { .. } => "average:updated",
        }
    }
}

/// The record an event is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventData {
    Ranking(Ranking),
    AverageRank(AverageRank),
}

impl EventData {
    pub fn as_ranking(&self) -> Option<&Ranking> {
        match self {
            EventData::Ranking(ranking) => Some(ranking),
            EventData::AverageRank(_) => None,
        }
    }

    pub fn as_average_rank(&self) -> Option<&AverageRank> {
        match self {
            EventData::AverageRank(average) => Some(average),
            EventData::Ranking(_) => None,
        }
    }
}

/// An event together with its source and data, as delivered to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub event: RankingEvent,
    pub source: String,
    pub data: EventData,
}

/// Receives the notifications of ranking managers.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &RankingEvent, source: &str, data: &EventData);
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn notify(&self, _event: &RankingEvent, _source: &str, _data: &EventData) {}
}

#[cfg(feature = "emitter")]
pub use emitter::EmitterSink;
pub use recording::RecordingSink;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_are_distinct() {
        let names = [
            RankingEvent::Created.name(),
            RankingEvent::Updated { old_rank: 1 }.name(),
            RankingEvent::Deleted.name(),
            RankingEvent::AverageUpdated {
                old_average: 0.0,
                old_count: 0,
            }
            .name(),
        ];
        for (i, name) in names.iter().enumerate() {
            assert!(!names[i + 1..].contains(name));
        }
    }

    #[test]
    fn notification_json_carries_previous_values() {
        let event = RankingEvent::AverageUpdated {
            old_average: 2.5,
            old_count: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "AverageUpdated");
        assert_eq!(json["old_average"], 2.5);
        assert_eq!(json["old_count"], 2);
    }
}
