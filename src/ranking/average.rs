use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{new_id, now};
use crate::reference::{EntityReference, EntityType};

/// Running average of the rankings of one entity under one manager.
///
/// `average == sum / ranking_number` while `ranking_number > 0`, and the
/// average is `0.0` once every vote has been removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRank {
    id: String,
    manager_id: String,
    ranked_element: EntityReference,
    average: f64,
    ranking_number: u64,
    scale: u32,
    updated_at: SystemTime,
}

impl AverageRank {
    /// An empty aggregate: no vote, average 0.
    pub fn new(manager_id: impl Into<String>, ranked_element: EntityReference, scale: u32) -> Self {
        Self {
            id: new_id(),
            manager_id: manager_id.into(),
            ranked_element,
            average: 0.0,
            ranking_number: 0,
            scale,
            updated_at: now(),
        }
    }

    /// Rebuild an aggregate from stored values.
    pub fn from_parts(
        id: impl Into<String>,
        manager_id: impl Into<String>,
        ranked_element: EntityReference,
        average: f64,
        ranking_number: u64,
        scale: u32,
        updated_at: SystemTime,
    ) -> Self {
        Self {
            id: id.into(),
            manager_id: manager_id.into(),
            ranked_element,
            average,
            ranking_number,
            scale,
            updated_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn manager_id(&self) -> &str {
        &self.manager_id
    }

    pub fn ranked_element(&self) -> &EntityReference {
        &self.ranked_element
    }

    pub fn entity_type(&self) -> EntityType {
        self.ranked_element.entity_type()
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn ranking_number(&self) -> u64 {
        self.ranking_number
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn updated_at(&self) -> SystemTime {
        self.updated_at
    }

    pub fn add_vote(&mut self, vote: u32) -> &mut Self {
        let total = self.total() + f64::from(vote);
        self.ranking_number += 1;
        self.average = total / self.ranking_number as f64;
        self.updated_at = now();
        self
    }

    /// Remove a previously added vote. Removing the last vote resets the
    /// average to 0 instead of dividing by zero.
    pub fn remove_vote(&mut self, vote: u32) -> &mut Self {
        match self.ranking_number {
            0 => {
                warn!(
                    average_rank = %self.id,
                    manager_id = %self.manager_id,
                    vote,
                    "removing a vote from an empty average rank"
                );
                self.average = 0.0;
            }
            1 => {
                self.ranking_number = 0;
                self.average = 0.0;
            }
            count => {
                let total = self.total() - f64::from(vote);
                self.ranking_number = count - 1;
                self.average = total / self.ranking_number as f64;
            }
        }
        self.updated_at = now();
        self
    }

    /// Replace `old_vote` by `new_vote`; the number of votes is unchanged.
    pub fn update_vote(&mut self, old_vote: u32, new_vote: u32) -> &mut Self {
        if self.ranking_number > 0 {
            let total = self.total() - f64::from(old_vote) + f64::from(new_vote);
            self.average = total / self.ranking_number as f64;
        } else {
            warn!(
                average_rank = %self.id,
                manager_id = %self.manager_id,
                old_vote,
                new_vote,
                "updating a vote of an empty average rank"
            );
        }
        self.updated_at = now();
        self
    }

    /// Replace the whole state, e.g. after recomputing from the stored votes.
    pub(crate) fn reset(&mut self, sum: u64, ranking_number: u64) -> &mut Self {
        self.ranking_number = ranking_number;
        self.average = if ranking_number == 0 {
            0.0
        } else {
            sum as f64 / ranking_number as f64
        };
        self.updated_at = now();
        self
    }

    fn total(&self) -> f64 {
        self.average * self.ranking_number as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn empty() -> AverageRank {
        AverageRank::new("stars", EntityReference::document("xwiki:Main.WebHome"), 5)
    }

    #[test]
    fn new_average_rank_is_empty() {
        let average = empty();
        assert_eq!(average.ranking_number(), 0);
        assert_eq!(average.average(), 0.0);
        assert_eq!(average.scale(), 5);
        assert_eq!(average.entity_type(), EntityType::Document);
    }

    #[test]
    fn add_votes_in_sequence() {
        let mut average = empty();
        average.add_vote(4);
        assert_eq!(average.average(), 4.0);

        for vote in [1, 3, 0, 3, 2] {
            average.add_vote(vote);
        }
        assert_eq!(average.ranking_number(), 6);
        assert!((average.average() - 13.0 / 6.0).abs() < EPSILON);
        assert!((average.average() - 2.166667).abs() < 1e-6);
    }

    #[test]
    fn add_then_remove_restores_previous_state() {
        let mut average = empty();
        for vote in [5, 2, 4] {
            average.add_vote(vote);
        }
        let before = (average.average(), average.ranking_number());

        average.add_vote(1).remove_vote(1);

        assert_eq!(average.ranking_number(), before.1);
        assert!((average.average() - before.0).abs() < EPSILON);
    }

    #[test]
    fn removing_last_vote_resets_to_zero() {
        let mut average = empty();
        average.add_vote(3);
        average.remove_vote(3);
        assert_eq!(average.ranking_number(), 0);
        assert_eq!(average.average(), 0.0);
        assert!(!average.average().is_nan());
    }

    #[test]
    fn removing_from_empty_stays_empty() {
        let mut average = empty();
        average.remove_vote(2);
        assert_eq!(average.ranking_number(), 0);
        assert_eq!(average.average(), 0.0);
    }

    #[test]
    fn updating_a_vote_of_an_empty_average_changes_nothing_but_the_date() {
        let mut average = empty();
        let before = average.updated_at();
        std::thread::sleep(std::time::Duration::from_millis(2));

        average.update_vote(2, 5);

        assert_eq!(average.ranking_number(), 0);
        assert_eq!(average.average(), 0.0);
        assert!(average.updated_at() > before);
    }

    #[test]
    fn update_vote_keeps_count_and_shifts_average() {
        let mut average = empty();
        for vote in [4, 1, 3] {
            average.add_vote(vote);
        }
        let before = average.average();

        average.update_vote(1, 5);

        assert_eq!(average.ranking_number(), 3);
        assert!((average.average() - (before + 4.0 / 3.0)).abs() < EPSILON);
    }

    #[test]
    fn removing_every_vote_returns_to_empty() {
        let mut average = empty();
        let votes = [4, 1, 3, 0, 3, 2];
        for vote in votes {
            average.add_vote(vote);
        }
        average.update_vote(0, 5);
        for vote in [4, 1, 3, 5, 3, 2] {
            average.remove_vote(vote);
        }
        assert_eq!(average.ranking_number(), 0);
        assert_eq!(average.average(), 0.0);
    }

    #[test]
    fn operations_refresh_update_date() {
        let mut average = AverageRank::from_parts(
            "id",
            "stars",
            EntityReference::document("xwiki:Main.WebHome"),
            2.0,
            3,
            5,
            std::time::UNIX_EPOCH,
        );
        average.update_vote(2, 3);
        assert!(average.updated_at() > std::time::UNIX_EPOCH);
    }

    #[test]
    fn reset_rebuilds_from_totals() {
        let mut average = empty();
        average.add_vote(1);
        average.reset(12, 4);
        assert_eq!(average.ranking_number(), 4);
        assert_eq!(average.average(), 3.0);
        average.reset(0, 0);
        assert_eq!(average.average(), 0.0);
    }
}
