pub mod config;
mod error;
pub mod events;
pub mod factory;
pub mod index;
pub mod lock;
pub mod manager;
mod ranking;
mod reference;
pub mod script;

pub use config::{ConfigurationRegistry, RankingConfiguration};
pub use error::RankingError;
#[cfg(feature = "emitter")]
pub use events::EmitterSink;
pub use events::{EventData, EventSink, NoopSink, Notification, RankingEvent, RecordingSink};
pub use factory::{DefaultRankingManagerFactory, RankingManagerFactory};
pub use index::{IndexCore, IndexError, IndexProvider, InMemoryIndex};
pub use manager::{
    FilterValue, IndexRankingManager, RankingManager, RankingQuery, RankingQueryField,
};
pub use ranking::{AverageRank, Ranking};
pub use reference::{EntityReference, EntityType, UserReference};
pub use script::RankingScriptService;

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
