use std::sync::Arc;

use ranking_rust::{
    EntityReference, EntityType, InMemoryIndex, IndexRankingManager, RankingConfiguration,
    RecordingSink, UserReference,
};

pub const EPSILON: f64 = 1e-6;

pub fn home() -> EntityReference {
    EntityReference::document("xwiki:Main.WebHome")
}

pub fn logo() -> EntityReference {
    EntityReference::new(EntityType::Attachment, "xwiki:Main.WebHome@logo.png")
}

pub fn user(name: &str) -> UserReference {
    UserReference::new(format!("xwiki:XWiki.{}", name))
}

pub fn configuration(scale: u32, store_zero: bool, store_average: bool) -> RankingConfiguration {
    RankingConfiguration {
        scale,
        store_zero,
        store_average,
        ..RankingConfiguration::default()
    }
}

/// A manager over a fresh in-memory index, with the index and the sink
/// kept for inspection.
pub struct Harness {
    pub manager: IndexRankingManager<InMemoryIndex>,
    pub index: InMemoryIndex,
    pub sink: RecordingSink,
}

impl Harness {
    pub fn new(identifier: &str, configuration: RankingConfiguration) -> Self {
        Self::on_index(identifier, configuration, InMemoryIndex::new())
    }

    pub fn on_index(
        identifier: &str,
        configuration: RankingConfiguration,
        index: InMemoryIndex,
    ) -> Self {
        let sink = RecordingSink::new();
        let manager = IndexRankingManager::new(
            identifier,
            configuration,
            index.clone(),
            Arc::new(sink.clone()),
        )
        .unwrap();
        Harness {
            manager,
            index,
            sink,
        }
    }
}
