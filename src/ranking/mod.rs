//! Vote and aggregate records.
//!
//! A [`Ranking`] is one voter's rank of one entity under one manager. An
//! [`AverageRank`] is the running average of every ranking stored for an
//! entity under a manager; it is derived data and can always be rebuilt from
//! the rankings.

mod average;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reference::{EntityReference, EntityType, UserReference};

pub use average::AverageRank;

/// A single vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub id: String,
    pub manager_id: String,
    pub ranked_element: EntityReference,
    pub voter: UserReference,
    pub rank: u32,
    pub scale: u32,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl Ranking {
    /// Create a brand new ranking with a random identifier and both
    /// timestamps set to now.
    pub fn new(
        manager_id: impl Into<String>,
        ranked_element: EntityReference,
        voter: UserReference,
        rank: u32,
        scale: u32,
    ) -> Self {
        let now = now();
        Self {
            id: new_id(),
            manager_id: manager_id.into(),
            ranked_element,
            voter,
            rank,
            scale,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.ranked_element.entity_type()
    }

    /// Change the rank, keeping the identity and creation date.
    pub fn update_rank(&mut self, rank: u32) {
        self.rank = rank;
        self.updated_at = now();
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time truncated to the millisecond precision of stored dates.
pub(crate) fn now() -> SystemTime {
    from_millis(to_millis(SystemTime::now()))
}

pub(crate) fn to_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_millis() as i64,
        Err(before) => -(before.duration().as_millis() as i64),
    }
}

pub(crate) fn from_millis(millis: i64) -> SystemTime {
    if millis >= 0 {
        UNIX_EPOCH + Duration::from_millis(millis as u64)
    } else {
        UNIX_EPOCH - Duration::from_millis(millis.unsigned_abs())
    }
}
