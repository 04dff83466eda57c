//! Caller-facing ranking service.
//!
//! Resolves managers by hint and never fails: errors are logged and turned
//! into empty results, which is what page scripts expect.

use std::sync::Arc;

use tracing::error;

use crate::factory::RankingManagerFactory;
use crate::manager::{RankingManager, RankingQuery, RankingQueryField};
use crate::ranking::{AverageRank, Ranking};
use crate::reference::{EntityReference, UserReference};

pub struct RankingScriptService {
    factory: Arc<dyn RankingManagerFactory>,
}

impl RankingScriptService {
    pub fn new(factory: Arc<dyn RankingManagerFactory>) -> Self {
        RankingScriptService { factory }
    }

    /// Save the vote of `voter` for `reference` with the manager `manager_hint`.
    ///
    /// Returns the stored ranking, or `None` if nothing is stored (a 0 vote
    /// that is not kept) or on error.
    pub fn save_rank(
        &self,
        manager_hint: &str,
        reference: &EntityReference,
        voter: &UserReference,
        rank: i32,
    ) -> Option<Ranking> {
        let result = self
            .factory
            .get_instance(manager_hint)
            .and_then(|manager| manager.save_rank(reference, voter, rank));
        match result {
            Ok(ranking) => ranking,
            Err(err) => {
                error!(manager_hint, reference = %reference, error = %err, "error while trying to rank reference");
                None
            }
        }
    }

    /// Rankings of `reference`, most recently updated first.
    pub fn get_rankings(
        &self,
        manager_hint: &str,
        reference: &EntityReference,
        offset: usize,
        limit: usize,
    ) -> Vec<Ranking> {
        let query = RankingQuery::new().target(reference);
        let result = self.factory.get_instance(manager_hint).and_then(|manager| {
            manager.get_rankings(&query, offset, limit, RankingQueryField::UpdatedDate, false)
        });
        match result {
            Ok(rankings) => rankings,
            Err(err) => {
                error!(manager_hint, reference = %reference, error = %err, "error when getting rankings for reference");
                Vec::new()
            }
        }
    }

    /// Average rank of `reference`, `None` on error.
    pub fn get_average_rank(
        &self,
        manager_hint: &str,
        reference: &EntityReference,
    ) -> Option<AverageRank> {
        let result = self
            .factory
            .get_instance(manager_hint)
            .and_then(|manager| manager.get_average_rank(reference));
        match result {
            Ok(average) => Some(average),
            Err(err) => {
                error!(manager_hint, reference = %reference, error = %err, "error when getting average rank for reference");
                None
            }
        }
    }
}
