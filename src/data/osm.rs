/// OSM element ids. Editors such as JOSM use negative ids for new elements.
pub type OsmId = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: OsmId,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: &str, value: &str) -> Self {
        Tag {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Way {
    pub id: OsmId,
    /// Node refs in ring order. Closure is not enforced.
    pub nodes: Vec<OsmId>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberType {
    Node,
    Way,
    Relation,
}

impl MemberType {
    pub fn parse(value: &str) -> Option<MemberType> {
        match value {
            "node" => Some(MemberType::Node),
            "way" => Some(MemberType::Way),
            "relation" => Some(MemberType::Relation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub member_type: MemberType,
    pub id: OsmId,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relation {
    pub id: OsmId,
    pub members: Vec<Member>,
    pub tags: Vec<Tag>,
}
