use std::{fmt, io};

use quick_xml::events::attributes::AttrError;

use crate::data::osm::OsmId;

/// The source entity a tag error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Way(OsmId),
    Relation(OsmId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Way(id) => write!(f, "way {}", id),
            EntityRef::Relation(id) => write!(f, "relation {}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagErrorKind {
    Missing,
    InvalidValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagError {
    pub tag: &'static str,
    pub kind: TagErrorKind,
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TagErrorKind::Missing => write!(f, "Missing tag or tag value: {}", self.tag),
            TagErrorKind::InvalidValue(value) => {
                write!(f, "Invalid value '{}' for tag: {}", value, self.tag)
            }
        }
    }
}

/// Every tag problem found on one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagErrors {
    pub entity: EntityRef,
    pub errors: Vec<TagError>,
}

impl TagErrors {
    pub fn tags(&self) -> Vec<&'static str> {
        self.errors.iter().map(|err| err.tag).collect()
    }
}

impl fmt::Display for TagErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Some required tags are missing on {}", self.entity)?;
        for (idx, err) in self.errors.iter().enumerate() {
            let separator = if idx == 0 { ": " } else { "; " };
            write!(f, "{}{}", separator, err)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] AttrError),

    #[error("Malformed OSM data: {0}")]
    MalformedOsm(String),

    #[error("Could not parse config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Node {0} appears more than once in the input")]
    DuplicateNodeId(OsmId),

    #[error("Way {way} references node {node} which is not present in the input")]
    UnresolvedNode { way: OsmId, node: OsmId },

    #[error("Relation {relation} references way {way} which was not mapped to a zone")]
    UnresolvedMember { relation: OsmId, way: OsmId },

    #[error("Zone id {id} produced by way {second_way} was already produced by way {first_way}")]
    DuplicateZoneId {
        id: String,
        first_way: OsmId,
        second_way: OsmId,
    },

    #[error("{0}")]
    MissingTags(TagErrors),

    #[error("Target entity {0} is not supported. Use TariffZone, FareZone or TopographicPlace")]
    UnknownTargetEntity(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_errors_display_lists_every_tag() {
        let errors = TagErrors {
            entity: EntityRef::Way(-12),
            errors: vec![
                TagError { tag: "codespace", kind: TagErrorKind::Missing },
                TagError {
                    tag: "scopingMethod",
                    kind: TagErrorKind::InvalidValue("explicit".to_string()),
                },
            ],
        };

        assert_eq!(
            Error::MissingTags(errors).to_string(),
            "Some required tags are missing on way -12: \
             Missing tag or tag value: codespace; \
             Invalid value 'explicit' for tag: scopingMethod"
        );
    }
}
