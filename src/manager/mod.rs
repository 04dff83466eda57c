//! Ranking managers: save, query and remove votes, and read average ranks.
//!
//! A manager is identified by a hint (e.g. an application name) which
//! namespaces every vote and average it stores, and is bound to a
//! [`RankingConfiguration`].
//!
//! ## Example
//!
//! ```ignore
//! use ranking_rust::{IndexRankingManager, InMemoryIndex, RankingManager, RecordingSink};
//!
//! let manager = IndexRankingManager::new(
//!     "stars",
//!     RankingConfiguration::default(),
//!     InMemoryIndex::new(),
//!     Arc::new(RecordingSink::new()),
//! )?;
//! let ranking = manager.save_rank(&target, &UserReference::new("xwiki:XWiki.Alice"), 4)?;
//! let average = manager.get_average_rank(&target)?;
//! ```

mod documents;
mod index;

use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::config::RankingConfiguration;
use crate::index::FieldValue;
use crate::ranking::{to_millis, AverageRank, Ranking};
use crate::reference::{EntityReference, EntityType, UserReference};
use crate::RankingError;

/// Fields of a ranking that can be filtered and sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RankingQueryField {
    Identifier,
    EntityReference,
    EntityType,
    UserReference,
    Vote,
    CreatedDate,
    UpdatedDate,
    ManagerId,
    Scale,
}

impl RankingQueryField {
    /// Name of the field in the stored documents.
    pub fn field_name(&self) -> &'static str {
        match self {
            RankingQueryField::Identifier => "id",
            RankingQueryField::EntityReference => "rankedElement",
            RankingQueryField::EntityType => "entityType",
            RankingQueryField::UserReference => "voter",
            RankingQueryField::Vote => "vote",
            RankingQueryField::CreatedDate => "createdAt",
            RankingQueryField::UpdatedDate => "updatedAt",
            RankingQueryField::ManagerId => "managerId",
            RankingQueryField::Scale => "scale",
        }
    }
}

/// A value to match exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Date(SystemTime),
    Entity(EntityReference),
    EntityType(EntityType),
    User(UserReference),
}

impl FilterValue {
    pub(crate) fn to_field_value(&self) -> FieldValue {
        match self {
            FilterValue::Text(value) => FieldValue::Text(value.clone()),
            FilterValue::Integer(value) => FieldValue::Integer(*value),
            FilterValue::Date(value) => FieldValue::Date(to_millis(*value)),
            FilterValue::Entity(reference) => FieldValue::Text(reference.serialized().to_string()),
            FilterValue::EntityType(entity_type) => FieldValue::Text(entity_type.to_string()),
            FilterValue::User(user) => FieldValue::Text(user.as_str().to_string()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        FilterValue::Integer(i64::from(value))
    }
}

impl From<SystemTime> for FilterValue {
    fn from(value: SystemTime) -> Self {
        FilterValue::Date(value)
    }
}

impl From<EntityReference> for FilterValue {
    fn from(value: EntityReference) -> Self {
        FilterValue::Entity(value)
    }
}

impl From<EntityType> for FilterValue {
    fn from(value: EntityType) -> Self {
        FilterValue::EntityType(value)
    }
}

impl From<UserReference> for FilterValue {
    fn from(value: UserReference) -> Self {
        FilterValue::User(value)
    }
}

/// Exact-match filters combined with AND, at most one value per field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankingQuery {
    filters: BTreeMap<RankingQueryField, FilterValue>,
}

impl RankingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `field` exactly; replaces a previous filter on the same field.
    pub fn filter(mut self, field: RankingQueryField, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(field, value.into());
        self
    }

    /// Match the rankings of `target`: both its serialized reference and its type.
    pub fn target(self, target: &EntityReference) -> Self {
        self.filter(RankingQueryField::EntityReference, target.clone())
            .filter(RankingQueryField::EntityType, target.entity_type())
    }

    pub fn voter(self, voter: &UserReference) -> Self {
        self.filter(RankingQueryField::UserReference, voter.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RankingQueryField, &FilterValue)> {
        self.filters.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Stores votes of one namespace and keeps their average per target.
pub trait RankingManager: Send + Sync {
    /// The hint this manager was built for; namespaces every record.
    fn identifier(&self) -> &str;

    fn configuration(&self) -> &RankingConfiguration;

    /// Upper bound of a vote.
    fn scale(&self) -> u32 {
        self.configuration().scale
    }

    /// Save the vote of `voter` for `ranked_entity`.
    ///
    /// A voter has at most one ranking per entity: a second vote updates it.
    /// Returns `None` when no ranking is stored as a result, i.e. a 0 vote
    /// when zeros are not stored.
    fn save_rank(
        &self,
        ranked_entity: &EntityReference,
        voter: &UserReference,
        vote: i32,
    ) -> Result<Option<Ranking>, RankingError>;

    /// Rankings of this manager matching `query`, sorted on `order_by`.
    fn get_rankings(
        &self,
        query: &RankingQuery,
        offset: usize,
        limit: usize,
        order_by: RankingQueryField,
        ascending: bool,
    ) -> Result<Vec<Ranking>, RankingError>;

    /// Number of rankings of this manager matching `query`.
    fn count_rankings(&self, query: &RankingQuery) -> Result<u64, RankingError>;

    /// Remove a ranking by identifier. Returns `false` if there was none.
    fn remove_ranking(&self, ranking_id: &str) -> Result<bool, RankingError>;

    /// Average rank of `ranked_entity`; an unsaved empty one if no vote was
    /// ever stored for it.
    fn get_average_rank(&self, ranked_entity: &EntityReference) -> Result<AverageRank, RankingError>;
}

pub use index::IndexRankingManager;
pub(crate) use documents::AverageRankField;
pub use documents::{AVERAGE_RANK_CORE, RANKING_CORE};
