use self::osm::{Node, Relation, Way};

pub mod netex;
pub mod osm;

/// Map data as defined in the .osm file. Elements keep their document order, since
/// output ordering follows input ordering.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OsmMapData {
    pub generator: Option<String>,
    pub version: Option<String>,
    pub nodes: Vec<Node>,
    pub ways: Vec<Way>,
    pub relations: Vec<Relation>,
}
