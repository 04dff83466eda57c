//! Identities of ranked entities and voters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RankingError;

/// The kind of entity a reference points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Wiki,
    Space,
    Document,
    Attachment,
    Object,
    ObjectProperty,
    Class,
    ClassProperty,
    Page,
    PageAttachment,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Wiki => "WIKI",
            EntityType::Space => "SPACE",
            EntityType::Document => "DOCUMENT",
            EntityType::Attachment => "ATTACHMENT",
            EntityType::Object => "OBJECT",
            EntityType::ObjectProperty => "OBJECT_PROPERTY",
            EntityType::Class => "CLASS",
            EntityType::ClassProperty => "CLASS_PROPERTY",
            EntityType::Page => "PAGE",
            EntityType::PageAttachment => "PAGE_ATTACHMENT",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = RankingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "WIKI" => EntityType::Wiki,
            "SPACE" => EntityType::Space,
            "DOCUMENT" => EntityType::Document,
            "ATTACHMENT" => EntityType::Attachment,
            "OBJECT" => EntityType::Object,
            "OBJECT_PROPERTY" => EntityType::ObjectProperty,
            "CLASS" => EntityType::Class,
            "CLASS_PROPERTY" => EntityType::ClassProperty,
            "PAGE" => EntityType::Page,
            "PAGE_ATTACHMENT" => EntityType::PageAttachment,
            other => {
                return Err(RankingError::InvalidDocument(format!(
                    "unknown entity type [{}]",
                    other
                )))
            }
        })
    }
}

/// A typed reference to a ranked entity.
///
/// The `reference` part is the serialized form used as the exact-match key in
/// the index (e.g. `"xwiki:Main.WebHome"`); two references are the same target
/// only when both the serialized form and the type match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    entity_type: EntityType,
    reference: String,
}

impl EntityReference {
    pub fn new(entity_type: EntityType, reference: impl Into<String>) -> Self {
        Self {
            entity_type,
            reference: reference.into(),
        }
    }

    pub fn document(reference: impl Into<String>) -> Self {
        Self::new(EntityType::Document, reference)
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Serialized form of the reference, without the type.
    pub fn serialized(&self) -> &str {
        &self.reference
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity_type, self.reference)
    }
}

/// The identity of a voter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserReference(String);

impl UserReference {
    pub fn new(reference: impl Into<String>) -> Self {
        UserReference(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserReference {
    fn from(value: &str) -> Self {
        UserReference::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_round_trips_through_its_name() {
        for entity_type in [
            EntityType::Wiki,
            EntityType::Document,
            EntityType::ObjectProperty,
            EntityType::PageAttachment,
        ] {
            assert_eq!(entity_type.as_str().parse::<EntityType>().unwrap(), entity_type);
        }
    }

    #[test]
    fn unknown_entity_type_is_rejected() {
        let err = "PARAGRAPH".parse::<EntityType>().unwrap_err();
        assert!(matches!(err, RankingError::InvalidDocument(_)));
    }

    #[test]
    fn same_serialized_reference_with_other_type_is_another_target() {
        let doc = EntityReference::new(EntityType::Document, "xwiki:Main.WebHome");
        let page = EntityReference::new(EntityType::Page, "xwiki:Main.WebHome");
        assert_ne!(doc, page);
        assert_eq!(doc.serialized(), page.serialized());
    }
}
