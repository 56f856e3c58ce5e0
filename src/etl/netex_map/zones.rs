use std::collections::HashMap;

use log::info;

use crate::{
    data::{
        netex::{
            FareZone, KeyValue, TargetEntity, TariffZone, TopographicPlace, Zone, ZoneCommon,
            ZoneRecord, DEFAULT_VERSION,
        },
        osm::{OsmId, Way},
    },
    errors::{EntityRef, Error, Result},
};

use super::{
    geometry::{way_polygon, NodeIndex},
    tags::{
        ZoneTags, FARE_ZONE_SCHEMA, TARIFF_ZONE_SCHEMA, TOPOGRAPHIC_PLACE_SCHEMA, TZ_MAPPING,
    },
};

/// Zones in way order, keyed by the way they came from.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MappedZones {
    entries: Vec<(OsmId, Zone)>,
}

impl MappedZones {
    pub fn iter(&self) -> impl Iterator<Item = &(OsmId, Zone)> {
        self.entries.iter()
    }

    /// Output id of each mapped way.
    pub fn ids_by_way(&self) -> HashMap<OsmId, &str> {
        self.entries
            .iter()
            .map(|(way_id, zone)| (*way_id, zone.id()))
            .collect()
    }

    pub fn into_zones(self) -> Vec<Zone> {
        self.entries.into_iter().map(|(_, zone)| zone).collect()
    }
}

/// Maps every way in input order. The first failing way aborts the batch.
pub fn map_ways(ways: &[Way], nodes: &NodeIndex, target: TargetEntity) -> Result<MappedZones> {
    let mut entries = Vec::with_capacity(ways.len());
    let mut way_by_id: HashMap<String, OsmId> = HashMap::with_capacity(ways.len());

    for way in ways {
        let zone = map_way(way, nodes, target)?;
        if let Some(first_way) = way_by_id.insert(zone.id().to_string(), way.id) {
            return Err(Error::DuplicateZoneId {
                id: zone.id().to_string(),
                first_way,
                second_way: way.id,
            });
        }
        entries.push((way.id, zone));
    }

    info!(target_entity = target.type_name(), zones = entries.len(); "Mapped ways to zones");
    Ok(MappedZones { entries })
}

pub fn map_way(way: &Way, nodes: &NodeIndex, target: TargetEntity) -> Result<Zone> {
    let entity = EntityRef::Way(way.id);
    let zone = match target {
        TargetEntity::TariffZone => {
            let tags = TARIFF_ZONE_SCHEMA.interpret(&way.tags, entity)?;
            let common = zone_common(generated_id(&tags, target), &tags, way, nodes)?;
            Zone::Tariff(TariffZone { common })
        }
        TargetEntity::TopographicPlace => {
            let tags = TOPOGRAPHIC_PLACE_SCHEMA.interpret(&way.tags, entity)?;
            let common = zone_common(generated_id(&tags, target), &tags, way, nodes)?;
            Zone::TopographicPlace(TopographicPlace {
                descriptor: common.name.clone(),
                common,
            })
        }
        TargetEntity::FareZone => {
            let mut tags = FARE_ZONE_SCHEMA.interpret(&way.tags, entity)?;
            let mapping = tz_mapping(&tags);
            tags.key_list.push(mapping);
            let id = tags.fare_zone_id.clone().unwrap_or_default();
            let common = zone_common(id, &tags, way, nodes)?;
            Zone::Fare(FareZone {
                common,
                private_code: tags.private_code.unwrap_or_default(),
                scoping_method: tags.scoping_method,
                zone_topology: tags.zone_topology,
                authority_ref: tags.authority_ref,
                members: tags.members,
                neighbours: tags.neighbours,
            })
        }
    };
    Ok(zone)
}

/// `<codespace>:<type>:<reference>`, e.g. `VOT:TariffZone:42`.
pub fn generate_id(codespace: &str, type_name: &str, reference: &str) -> String {
    format!("{}:{}:{}", codespace, type_name, reference)
}

fn generated_id(tags: &ZoneTags, target: TargetEntity) -> String {
    generate_id(
        tags.codespace.as_deref().unwrap_or_default(),
        target.type_name(),
        tags.reference.as_deref().unwrap_or_default(),
    )
}

/// Explicit `tzMapping` tag, or the tariff zone sharing the fare zone's private code.
fn tz_mapping(tags: &ZoneTags) -> KeyValue {
    let value = match &tags.tz_mapping {
        Some(tariff_zone_ref) => tariff_zone_ref.clone(),
        None => generate_id(
            tags.codespace.as_deref().unwrap_or_default(),
            TargetEntity::TariffZone.type_name(),
            tags.private_code.as_deref().unwrap_or_default(),
        ),
    };
    KeyValue {
        key: TZ_MAPPING.to_string(),
        value,
    }
}

fn zone_common(id: String, tags: &ZoneTags, way: &Way, nodes: &NodeIndex) -> Result<ZoneCommon> {
    Ok(ZoneCommon {
        id,
        version: DEFAULT_VERSION.to_string(),
        name: tags.name.clone(),
        valid_between: tags.valid_between(),
        key_list: tags.key_list.clone(),
        polygon: Some(way_polygon(way, nodes)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::osm::{Node, Tag};

    fn nodes() -> Vec<Node> {
        vec![
            Node { id: 1, lat: 59.0, lon: 9.0 },
            Node { id: 2, lat: 59.1, lon: 9.1 },
            Node { id: 3, lat: 59.0, lon: 9.2 },
        ]
    }

    fn way(id: OsmId, tags: &[(&str, &str)]) -> Way {
        Way {
            id,
            nodes: vec![1, 2, 3, 1],
            tags: tags.iter().map(|(k, v)| Tag::new(k, v)).collect(),
        }
    }

    fn fare_zone_way(id: OsmId, private_code: &str) -> Way {
        way(
            id,
            &[
                ("codespace", "VOT"),
                ("id", &format!("VOT:FareZone:{}", private_code)),
                ("privateCode", private_code),
                ("name:nor", "Kongsberg"),
            ],
        )
    }

    #[test]
    fn tariff_zone_id_is_generated() {
        let nodes = nodes();
        let zone = map_way(
            &way(5, &[("codespace", "VOT"), ("reference", "42")]),
            &NodeIndex::new(&nodes).unwrap(),
            TargetEntity::TariffZone,
        )
        .unwrap();

        assert_eq!(zone.id(), "VOT:TariffZone:42");
        assert_eq!(zone.version(), "1");
        assert_eq!(zone.common().polygon.as_ref().unwrap().exterior.len(), 8);
        assert!(matches!(zone, Zone::Tariff(_)));
    }

    #[test]
    fn topographic_place_gets_descriptor_name() {
        let nodes = nodes();
        let zone = map_way(
            &way(5, &[("codespace", "KVE"), ("reference", "3006"), ("name:nor", "Drammen")]),
            &NodeIndex::new(&nodes).unwrap(),
            TargetEntity::TopographicPlace,
        )
        .unwrap();

        assert_eq!(zone.id(), "KVE:TopographicPlace:3006");
        match zone {
            Zone::TopographicPlace(place) => assert_eq!(place.descriptor.unwrap().value, "Drammen"),
            other => panic!("expected topographic place, got {:?}", other),
        }
    }

    #[test]
    fn fare_zone_id_is_taken_verbatim_and_tz_mapping_defaults() {
        let nodes = nodes();
        let zone = map_way(&fare_zone_way(5, "630"), &NodeIndex::new(&nodes).unwrap(), TargetEntity::FareZone).unwrap();

        assert_eq!(zone.id(), "VOT:FareZone:630");
        match zone {
            Zone::Fare(fare_zone) => {
                assert_eq!(fare_zone.private_code, "630");
                assert_eq!(
                    fare_zone.common.key_list,
                    vec![KeyValue {
                        key: "tzMapping".to_string(),
                        value: "VOT:TariffZone:630".to_string(),
                    }]
                );
            }
            other => panic!("expected fare zone, got {:?}", other),
        }
    }

    #[test]
    fn explicit_tz_mapping_is_kept() {
        let nodes = nodes();
        let mut way = fare_zone_way(5, "630");
        way.tags.push(Tag::new("tzMapping", "VOT:TariffZone:999"));

        let zone = map_way(&way, &NodeIndex::new(&nodes).unwrap(), TargetEntity::FareZone).unwrap();
        assert_eq!(zone.common().key_list[0].value, "VOT:TariffZone:999");
    }

    #[test]
    fn keeps_way_order() {
        let nodes = nodes();
        let ways = vec![fare_zone_way(30, "3"), fare_zone_way(10, "1"), fare_zone_way(20, "2")];

        let zones = map_ways(&ways, &NodeIndex::new(&nodes).unwrap(), TargetEntity::FareZone).unwrap();

        let ids: Vec<(OsmId, &str)> = zones.iter().map(|(way_id, zone)| (*way_id, zone.id())).collect();
        assert_eq!(
            ids,
            vec![(30, "VOT:FareZone:3"), (10, "VOT:FareZone:1"), (20, "VOT:FareZone:2")]
        );
    }

    #[test]
    fn one_bad_way_fails_the_batch() {
        let nodes = nodes();
        let ways = vec![fare_zone_way(1, "1"), way(2, &[("codespace", "VOT")])];

        let err = map_ways(&ways, &NodeIndex::new(&nodes).unwrap(), TargetEntity::FareZone).unwrap_err();
        match err {
            Error::MissingTags(errors) => {
                assert_eq!(errors.entity, EntityRef::Way(2));
                assert_eq!(errors.tags(), vec!["id", "privateCode"]);
            }
            other => panic!("expected missing tags, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_zone_ids_fail() {
        let nodes = nodes();
        let ways = vec![
            way(1, &[("codespace", "VOT"), ("reference", "42")]),
            way(2, &[("codespace", "VOT"), ("reference", "42")]),
        ];

        let err = map_ways(&ways, &NodeIndex::new(&nodes).unwrap(), TargetEntity::TariffZone).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateZoneId { first_way: 1, second_way: 2, .. }
        ));
    }

    #[test]
    fn tags_are_checked_before_geometry() {
        let nodes = nodes();
        let mut bad = way(3, &[("codespace", "VOT")]);
        bad.nodes.push(99);

        let err = map_way(&bad, &NodeIndex::new(&nodes).unwrap(), TargetEntity::TariffZone).unwrap_err();
        assert!(matches!(err, Error::MissingTags(_)));
    }
}
