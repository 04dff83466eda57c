//! IndexRankingManager - Ranking manager storing votes and averages in an index.

use std::sync::Arc;

use tracing::debug;

use super::documents::{
    average_from_document, average_to_document, ranking_from_document, ranking_to_document,
    AVERAGE_RANK_CORE, RANKING_CORE,
};
use super::{AverageRankField, RankingManager, RankingQuery, RankingQueryField};
use crate::config::RankingConfiguration;
use crate::events::{EventData, EventSink, RankingEvent};
use crate::index::{IndexCore, IndexProvider, IndexQuery, SortOrder};
use crate::lock::{target_key, InMemoryLockManager, LockGuard, LockManager};
use crate::ranking::{AverageRank, Ranking};
use crate::reference::{EntityReference, UserReference};
use crate::RankingError;

/// Page size used when reading every ranking of a target.
const RECOMPUTE_BATCH: usize = 100;

/// Notifications produced under the lock of a target, delivered once it is released.
type Pending = Vec<(RankingEvent, EventData)>;

/// A [`RankingManager`] backed by an [`IndexProvider`].
///
/// Votes are stored in the shared `"ranking"` core, or in a core named after
/// the manager when the configuration asks for a dedicated store. Average
/// ranks are stored in the `"averageRank"` core.
///
/// Saving and removing votes take the lock of the target first, so the
/// lookup of the existing vote, the vote write and the average update are
/// not interleaved with another call on the same target within this process.
/// The vote and the average are two separate commits: if the second one
/// fails, the first one is not rolled back and the average can drift until
/// [`recompute_average_rank`](Self::recompute_average_rank) is called.
///
/// Events are delivered in commit order after the lock is released, so a
/// sink may call back into the manager for the same target.
pub struct IndexRankingManager<P, L = InMemoryLockManager> {
    identifier: String,
    configuration: RankingConfiguration,
    index: P,
    sink: Arc<dyn EventSink>,
    locks: L,
}

impl<P: IndexProvider> IndexRankingManager<P> {
    /// Fails with [`RankingError::Configuration`] when a dedicated store would
    /// be named like one of the shared cores.
    pub fn new(
        identifier: impl Into<String>,
        configuration: RankingConfiguration,
        index: P,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, RankingError> {
        let identifier = identifier.into();
        if configuration.has_dedicated_store
            && (identifier.is_empty() || identifier == RANKING_CORE || identifier == AVERAGE_RANK_CORE)
        {
            return Err(RankingError::Configuration(format!(
                "[{}] cannot be used as the name of a dedicated ranking store",
                identifier
            )));
        }
        Ok(IndexRankingManager {
            identifier,
            configuration,
            index,
            sink,
            locks: InMemoryLockManager::new(),
        })
    }
}

impl<P: IndexProvider, L: LockManager> IndexRankingManager<P, L> {
    /// Use another lock manager, e.g. one shared with other managers.
    pub fn with_lock_manager<M: LockManager>(self, locks: M) -> IndexRankingManager<P, M> {
        IndexRankingManager {
            identifier: self.identifier,
            configuration: self.configuration,
            index: self.index,
            sink: self.sink,
            locks,
        }
    }

    pub fn index(&self) -> &P {
        &self.index
    }

    /// Rebuild the average rank of `ranked_entity` from its stored rankings.
    ///
    /// The result is persisted (and notified) only when averages are stored.
    pub fn recompute_average_rank(
        &self,
        ranked_entity: &EntityReference,
    ) -> Result<AverageRank, RankingError> {
        let mut pending = Pending::new();
        let result = {
            let _guard = self.lock_target(ranked_entity)?;
            self.recompute_locked(ranked_entity, &mut pending)
        };
        self.deliver(pending);
        result
    }

    fn recompute_locked(
        &self,
        ranked_entity: &EntityReference,
        pending: &mut Pending,
    ) -> Result<AverageRank, RankingError> {
        let query = RankingQuery::new().target(ranked_entity);
        let mut sum: u64 = 0;
        let mut count: u64 = 0;
        let mut offset = 0;
        loop {
            let page = self.get_rankings(
                &query,
                offset,
                RECOMPUTE_BATCH,
                RankingQueryField::CreatedDate,
                true,
            )?;
            count += page.len() as u64;
            sum += page.iter().map(|ranking| u64::from(ranking.rank)).sum::<u64>();
            if page.len() < RECOMPUTE_BATCH {
                break;
            }
            offset += RECOMPUTE_BATCH;
        }

        let mut average = self.get_average_rank(ranked_entity)?;
        let event = RankingEvent::AverageUpdated {
            old_average: average.average(),
            old_count: average.ranking_number(),
        };
        average.reset(sum, count);

        if self.configuration.store_average {
            self.store_average(&average, "error while recomputing average rank")?;
            pending.push((event, EventData::AverageRank(average.clone())));
        }
        Ok(average)
    }

    fn ranking_core(&self) -> Result<Arc<P::Core>, crate::index::IndexError> {
        if self.configuration.has_dedicated_store {
            self.index.core(&self.identifier)
        } else {
            self.index.core(RANKING_CORE)
        }
    }

    fn average_core(&self) -> Result<Arc<P::Core>, crate::index::IndexError> {
        self.index.core(AVERAGE_RANK_CORE)
    }

    fn lock_target(
        &self,
        ranked_entity: &EntityReference,
    ) -> Result<LockGuard<L::Lock>, RankingError> {
        let key = target_key(&self.identifier, ranked_entity);
        let lock = self.locks.get_lock(&key)?;
        Ok(LockGuard::acquire(lock, key)?)
    }

    /// Translate a ranking query, always restricting it to this manager.
    fn index_query(&self, query: &RankingQuery) -> IndexQuery {
        let mut index_query = IndexQuery::new();
        for (field, value) in query.iter() {
            if *field != RankingQueryField::ManagerId {
                index_query = index_query.filter(field.field_name(), value.to_field_value());
            }
        }
        index_query.filter(
            RankingQueryField::ManagerId.field_name(),
            self.identifier.as_str(),
        )
    }

    fn retrieve_existing_ranking(
        &self,
        ranked_entity: &EntityReference,
        voter: &UserReference,
    ) -> Result<Option<Ranking>, RankingError> {
        let query = RankingQuery::new().target(ranked_entity).voter(voter);
        let mut rankings = self.get_rankings(&query, 0, 1, RankingQueryField::CreatedDate, true)?;
        Ok(rankings.pop())
    }

    fn find_ranking(&self, ranking_id: &str) -> Result<Option<Ranking>, RankingError> {
        let query = RankingQuery::new().filter(RankingQueryField::Identifier, ranking_id);
        let mut rankings = self.get_rankings(&query, 0, 1, RankingQueryField::CreatedDate, true)?;
        Ok(rankings.pop())
    }

    fn store_ranking(&self, ranking: &Ranking, context: &str) -> Result<(), RankingError> {
        let core = self.ranking_core().map_err(RankingError::index(context))?;
        core.add(ranking_to_document(ranking))
            .and_then(|_| core.commit())
            .map_err(RankingError::index(context))?;
        debug!(manager_id = %self.identifier, ranking = %ranking.id, rank = ranking.rank, "stored ranking");
        Ok(())
    }

    fn store_average(&self, average: &AverageRank, context: &str) -> Result<(), RankingError> {
        let core = self.average_core().map_err(RankingError::index(context))?;
        core.add(average_to_document(average))
            .and_then(|_| core.commit())
            .map_err(RankingError::index(context))?;
        debug!(
            manager_id = %self.identifier,
            average_rank = %average.id(),
            average = average.average(),
            count = average.ranking_number(),
            "stored average rank"
        );
        Ok(())
    }

    /// Notify the sink, in order. Called with no target lock held.
    fn deliver(&self, pending: Pending) {
        for (event, data) in pending {
            debug!(manager_id = %self.identifier, event = event.name(), "notifying ranking event");
            self.sink.notify(&event, &self.identifier, &data);
        }
    }

    /// Delete `ranking` and update the average of its target.
    /// The caller holds the lock of the target.
    fn delete_ranking(&self, ranking: &Ranking, pending: &mut Pending) -> Result<(), RankingError> {
        const CONTEXT: &str = "error while removing ranking";

        let core = self.ranking_core().map_err(RankingError::index(CONTEXT))?;
        core.delete_by_id(&ranking.id)
            .and_then(|_| core.commit())
            .map_err(RankingError::index(CONTEXT))?;
        debug!(manager_id = %self.identifier, ranking = %ranking.id, "removed ranking");
        pending.push((RankingEvent::Deleted, EventData::Ranking(ranking.clone())));

        if self.configuration.store_average {
            let mut average = self.get_average_rank(&ranking.ranked_element)?;
            let event = RankingEvent::AverageUpdated {
                old_average: average.average(),
                old_count: average.ranking_number(),
            };
            average.remove_vote(ranking.rank);
            self.store_average(&average, CONTEXT)?;
            pending.push((event, EventData::AverageRank(average)));
        }
        Ok(())
    }

    fn save_rank_locked(
        &self,
        ranked_entity: &EntityReference,
        voter: &UserReference,
        rank: u32,
        pending: &mut Pending,
    ) -> Result<Option<Ranking>, RankingError> {
        let store_zero = self.configuration.store_zero;
        let store_average = self.configuration.store_average;

        let (ranking, event, average_update) = match self.retrieve_existing_ranking(ranked_entity, voter)? {
            None if rank == 0 && !store_zero => return Ok(None),
            None => {
                let ranking = Ranking::new(
                    self.identifier.clone(),
                    ranked_entity.clone(),
                    voter.clone(),
                    rank,
                    self.scale(),
                );
                let average_update = if store_average {
                    let mut average = self.get_average_rank(ranked_entity)?;
                    let event = RankingEvent::AverageUpdated {
                        old_average: average.average(),
                        old_count: average.ranking_number(),
                    };
                    average.add_vote(rank);
                    Some((average, event))
                } else {
                    None
                };
                (ranking, RankingEvent::Created, average_update)
            }
            Some(existing) if rank == 0 && !store_zero => {
                self.delete_ranking(&existing, pending)?;
                return Ok(None);
            }
            Some(mut ranking) => {
                let old_rank = ranking.rank;
                ranking.update_rank(rank);
                let average_update = if store_average {
                    let mut average = self.get_average_rank(ranked_entity)?;
                    let event = RankingEvent::AverageUpdated {
                        old_average: average.average(),
                        old_count: average.ranking_number(),
                    };
                    average.update_vote(old_rank, rank);
                    Some((average, event))
                } else {
                    None
                };
                (ranking, RankingEvent::Updated { old_rank }, average_update)
            }
        };

        let context = format!(
            "error when storing rank information for entity [{}] with user [{}]",
            ranked_entity, voter
        );
        self.store_ranking(&ranking, &context)?;
        pending.push((event, EventData::Ranking(ranking.clone())));

        if let Some((average, event)) = average_update {
            self.store_average(&average, &context)?;
            pending.push((event, EventData::AverageRank(average)));
        }

        Ok(Some(ranking))
    }

    fn validate_vote(&self, vote: i32) -> Result<u32, RankingError> {
        u32::try_from(vote)
            .ok()
            .filter(|rank| *rank <= self.scale())
            .ok_or_else(|| RankingError::OutOfScale {
                vote,
                scale: self.scale(),
                manager_id: self.identifier.clone(),
            })
    }
}

impl<P: IndexProvider, L: LockManager> RankingManager for IndexRankingManager<P, L> {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn configuration(&self) -> &RankingConfiguration {
        &self.configuration
    }

    fn save_rank(
        &self,
        ranked_entity: &EntityReference,
        voter: &UserReference,
        vote: i32,
    ) -> Result<Option<Ranking>, RankingError> {
        let rank = self.validate_vote(vote)?;
        let mut pending = Pending::new();
        let result = {
            let _guard = self.lock_target(ranked_entity)?;
            self.save_rank_locked(ranked_entity, voter, rank, &mut pending)
        };
        self.deliver(pending);
        result
    }

    fn get_rankings(
        &self,
        query: &RankingQuery,
        offset: usize,
        limit: usize,
        order_by: RankingQueryField,
        ascending: bool,
    ) -> Result<Vec<Ranking>, RankingError> {
        const CONTEXT: &str = "error while trying to get rankings";

        let index_query = self
            .index_query(query)
            .start(offset)
            .rows(limit)
            .sort(order_by.field_name(), SortOrder::from_ascending(ascending));
        let response = self
            .ranking_core()
            .and_then(|core| core.query(&index_query))
            .map_err(RankingError::index(CONTEXT))?;

        response
            .documents
            .iter()
            .map(ranking_from_document)
            .collect()
    }

    fn count_rankings(&self, query: &RankingQuery) -> Result<u64, RankingError> {
        const CONTEXT: &str = "error while trying to get count of rankings";

        let index_query = self.index_query(query).start(0).rows(0);
        let response = self
            .ranking_core()
            .and_then(|core| core.query(&index_query))
            .map_err(RankingError::index(CONTEXT))?;
        Ok(response.num_found)
    }

    fn remove_ranking(&self, ranking_id: &str) -> Result<bool, RankingError> {
        let Some(ranking) = self.find_ranking(ranking_id)? else {
            return Ok(false);
        };

        let mut pending = Pending::new();
        let result = {
            let _guard = self.lock_target(&ranking.ranked_element)?;
            // Another caller may have removed it while we waited for the lock.
            match self.find_ranking(ranking_id)? {
                Some(ranking) => self.delete_ranking(&ranking, &mut pending).map(|_| true),
                None => Ok(false),
            }
        };
        self.deliver(pending);
        result
    }

    fn get_average_rank(&self, ranked_entity: &EntityReference) -> Result<AverageRank, RankingError> {
        const CONTEXT: &str = "error while trying to get average ranking value";

        let query = IndexQuery::new()
            .filter(AverageRankField::ManagerId.field_name(), self.identifier.as_str())
            .filter(
                AverageRankField::RankedElement.field_name(),
                ranked_entity.serialized(),
            )
            .filter(
                AverageRankField::EntityType.field_name(),
                ranked_entity.entity_type().as_str(),
            )
            .start(0)
            .rows(1)
            .sort(AverageRankField::UpdatedAt.field_name(), SortOrder::Ascending);
        let response = self
            .average_core()
            .and_then(|core| core.query(&query))
            .map_err(RankingError::index(CONTEXT))?;

        match response.documents.first() {
            Some(document) => average_from_document(document, ranked_entity),
            None => Ok(AverageRank::new(
                self.identifier.clone(),
                ranked_entity.clone(),
                self.scale(),
            )),
        }
    }
}
