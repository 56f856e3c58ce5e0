//! Maps an OSM graph to the contents of a NeTEx site frame.
//!
//! Each way becomes one zone: its tags are read through the variant's tag schema,
//! its node refs become the zone polygon. For fare zones, relations become groups of
//! tariff zones whose members point at the zones mapped from the member ways.

pub mod geometry;
pub mod groups;
pub mod tags;
pub mod validation;
pub mod zones;

use log::info;

use crate::{
    data::{
        netex::{SiteFrame, TargetEntity},
        OsmMapData,
    },
    errors::Result,
};

use self::{geometry::NodeIndex, groups::map_relations, zones::map_ways};

/// Maps `osm` to the zone type named by `target_entity`. Unknown names fail before
/// anything is mapped.
pub fn map(osm: &OsmMapData, target_entity: &str) -> Result<SiteFrame> {
    let target: TargetEntity = target_entity.parse()?;
    map_entity(osm, target)
}

pub fn map_entity(osm: &OsmMapData, target: TargetEntity) -> Result<SiteFrame> {
    let nodes = NodeIndex::new(&osm.nodes)?;
    info!(nodes = nodes.len(); "Mapped nodes from osm file");

    let zones = map_ways(&osm.ways, &nodes, target)?;

    let groups_of_tariff_zones = if target == TargetEntity::FareZone && !osm.relations.is_empty() {
        Some(map_relations(&osm.relations, &zones)?)
    } else {
        None
    };

    Ok(SiteFrame {
        target,
        zones: zones.into_zones(),
        groups_of_tariff_zones,
    })
}
