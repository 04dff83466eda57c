//! Mapping between records and index documents.

use crate::index::{Document, FieldValue};
use crate::ranking::{from_millis, to_millis, AverageRank, Ranking};
use crate::reference::{EntityReference, EntityType, UserReference};
use crate::RankingError;

use super::RankingQueryField;

/// Core shared by every manager without a dedicated store.
pub const RANKING_CORE: &str = "ranking";

/// Core holding the average ranks of every manager.
pub const AVERAGE_RANK_CORE: &str = "averageRank";

/// Fields of a stored average rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AverageRankField {
    ManagerId,
    RankedElement,
    EntityType,
    Average,
    VoteNumber,
    Scale,
    UpdatedAt,
}

impl AverageRankField {
    pub(crate) fn field_name(&self) -> &'static str {
        match self {
            AverageRankField::ManagerId => "managerId",
            AverageRankField::RankedElement => "rankedElement",
            AverageRankField::EntityType => "entityType",
            AverageRankField::Average => "average",
            AverageRankField::VoteNumber => "voteNumber",
            AverageRankField::Scale => "scale",
            AverageRankField::UpdatedAt => "updatedAt",
        }
    }
}

pub(crate) fn ranking_to_document(ranking: &Ranking) -> Document {
    Document::new(ranking.id.clone())
        .with(
            RankingQueryField::ManagerId.field_name(),
            ranking.manager_id.as_str(),
        )
        .with(
            RankingQueryField::EntityReference.field_name(),
            ranking.ranked_element.serialized(),
        )
        .with(
            RankingQueryField::EntityType.field_name(),
            ranking.entity_type().as_str(),
        )
        .with(
            RankingQueryField::UserReference.field_name(),
            ranking.voter.as_str(),
        )
        .with(RankingQueryField::Vote.field_name(), ranking.rank)
        .with(RankingQueryField::Scale.field_name(), ranking.scale)
        .with(
            RankingQueryField::CreatedDate.field_name(),
            FieldValue::Date(to_millis(ranking.created_at)),
        )
        .with(
            RankingQueryField::UpdatedDate.field_name(),
            FieldValue::Date(to_millis(ranking.updated_at)),
        )
}

pub(crate) fn ranking_from_document(document: &Document) -> Result<Ranking, RankingError> {
    let entity_type: EntityType = text(document, RankingQueryField::EntityType.field_name())?.parse()?;
    Ok(Ranking {
        id: document.id.clone(),
        manager_id: text(document, RankingQueryField::ManagerId.field_name())?.to_string(),
        ranked_element: EntityReference::new(
            entity_type,
            text(document, RankingQueryField::EntityReference.field_name())?,
        ),
        voter: UserReference::new(text(document, RankingQueryField::UserReference.field_name())?),
        rank: unsigned(document, RankingQueryField::Vote.field_name())?,
        scale: unsigned(document, RankingQueryField::Scale.field_name())?,
        created_at: from_millis(date(document, RankingQueryField::CreatedDate.field_name())?),
        updated_at: from_millis(date(document, RankingQueryField::UpdatedDate.field_name())?),
    })
}

pub(crate) fn average_to_document(average: &AverageRank) -> Document {
    Document::new(average.id())
        .with(AverageRankField::ManagerId.field_name(), average.manager_id())
        .with(
            AverageRankField::RankedElement.field_name(),
            average.ranked_element().serialized(),
        )
        .with(
            AverageRankField::EntityType.field_name(),
            average.entity_type().as_str(),
        )
        .with(AverageRankField::Average.field_name(), average.average())
        .with(
            AverageRankField::VoteNumber.field_name(),
            FieldValue::Integer(average.ranking_number() as i64),
        )
        .with(AverageRankField::Scale.field_name(), average.scale())
        .with(
            AverageRankField::UpdatedAt.field_name(),
            FieldValue::Date(to_millis(average.updated_at())),
        )
}

pub(crate) fn average_from_document(
    document: &Document,
    ranked_element: &EntityReference,
) -> Result<AverageRank, RankingError> {
    let average = document
        .get(AverageRankField::Average.field_name())
        .and_then(FieldValue::as_double)
        .ok_or_else(|| missing(document, AverageRankField::Average.field_name()))?;
    let vote_number = integer(document, AverageRankField::VoteNumber.field_name())?;
    let vote_number = u64::try_from(vote_number).map_err(|_| {
        RankingError::InvalidDocument(format!(
            "negative vote number [{}] in [{}]",
            vote_number, document.id
        ))
    })?;

    Ok(AverageRank::from_parts(
        document.id.clone(),
        text(document, AverageRankField::ManagerId.field_name())?,
        ranked_element.clone(),
        average,
        vote_number,
        unsigned(document, AverageRankField::Scale.field_name())?,
        from_millis(date(document, AverageRankField::UpdatedAt.field_name())?),
    ))
}

fn missing(document: &Document, field: &str) -> RankingError {
    RankingError::InvalidDocument(format!(
        "field [{}] missing or of the wrong kind in [{}]",
        field, document.id
    ))
}

fn text<'a>(document: &'a Document, field: &str) -> Result<&'a str, RankingError> {
    document
        .get(field)
        .and_then(FieldValue::as_text)
        .ok_or_else(|| missing(document, field))
}

fn integer(document: &Document, field: &str) -> Result<i64, RankingError> {
    document
        .get(field)
        .and_then(FieldValue::as_integer)
        .ok_or_else(|| missing(document, field))
}

fn unsigned(document: &Document, field: &str) -> Result<u32, RankingError> {
    let value = integer(document, field)?;
    u32::try_from(value).map_err(|_| {
        RankingError::InvalidDocument(format!(
            "field [{}] out of range [{}] in [{}]",
            field, value, document.id
        ))
    })
}

fn date(document: &Document, field: &str) -> Result<i64, RankingError> {
    document
        .get(field)
        .and_then(FieldValue::as_date)
        .ok_or_else(|| missing(document, field))
}
