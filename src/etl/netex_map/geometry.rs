use std::collections::HashMap;

use crate::{
    data::{
        netex::Polygon,
        osm::{Node, OsmId, Way},
    },
    errors::{Error, Result},
};

const POLYGON_ID_PREFIX: &str = "GEN-PolygonType";

/// Node lookup built once per run, before any way is mapped.
pub struct NodeIndex<'a> {
    nodes: HashMap<OsmId, &'a Node>,
}

impl<'a> NodeIndex<'a> {
    /// Fails on the first node id seen twice.
    pub fn new(nodes: &'a [Node]) -> Result<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for node in nodes {
            if index.insert(node.id, node).is_some() {
                return Err(Error::DuplicateNodeId(node.id));
            }
        }
        Ok(NodeIndex { nodes: index })
    }

    pub fn get(&self, id: OsmId) -> Option<&'a Node> {
        self.nodes.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builds the exterior ring from the way's node refs, copying coordinates verbatim.
pub fn way_polygon(way: &Way, nodes: &NodeIndex) -> Result<Polygon> {
    let mut exterior = Vec::with_capacity(2 * way.nodes.len());
    for node_id in &way.nodes {
        let node = nodes.get(*node_id).ok_or(Error::UnresolvedNode {
            way: way.id,
            node: *node_id,
        })?;
        exterior.push(node.lat);
        exterior.push(node.lon);
    }

    Ok(Polygon {
        id: format!("{}{}", POLYGON_ID_PREFIX, way.id),
        exterior,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<Node> {
        vec![
            Node { id: 1, lat: 59.66, lon: 9.65 },
            Node { id: 2, lat: 59.67, lon: 9.66 },
            Node { id: 3, lat: 59.65, lon: 9.67 },
        ]
    }

    #[test]
    fn closed_ring_keeps_node_order() {
        let nodes = nodes();
        let index = NodeIndex::new(&nodes).unwrap();
        let way = Way {
            id: -7,
            nodes: vec![1, 2, 3, 1],
            tags: vec![],
        };

        let polygon = way_polygon(&way, &index).unwrap();

        assert_eq!(polygon.id, "GEN-PolygonType-7");
        assert_eq!(polygon.exterior.len(), 2 * way.nodes.len());
        assert_eq!(
            polygon.exterior,
            vec![59.66, 9.65, 59.67, 9.66, 59.65, 9.67, 59.66, 9.65]
        );
    }

    #[test]
    fn open_ring_is_not_closed() {
        let nodes = nodes();
        let index = NodeIndex::new(&nodes).unwrap();
        let way = Way {
            id: 1,
            nodes: vec![3, 2],
            tags: vec![],
        };

        let polygon = way_polygon(&way, &index).unwrap();
        assert_eq!(polygon.exterior, vec![59.65, 9.67, 59.67, 9.66]);
    }

    #[test]
    fn dangling_node_ref_fails() {
        let nodes = nodes();
        let index = NodeIndex::new(&nodes).unwrap();
        let way = Way {
            id: 10,
            nodes: vec![1, 4, 1],
            tags: vec![],
        };

        let err = way_polygon(&way, &index).unwrap_err();
        assert!(matches!(err, Error::UnresolvedNode { way: 10, node: 4 }));
    }

    #[test]
    fn repeated_node_id_fails() {
        let mut nodes = nodes();
        nodes.push(Node { id: 1, lat: 9.0, lon: 9.0 });

        let err = NodeIndex::new(&nodes).err().unwrap();
        assert!(matches!(err, Error::DuplicateNodeId(1)));
    }
}
