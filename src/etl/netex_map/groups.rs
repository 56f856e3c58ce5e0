use std::collections::HashMap;

use log::{info, warn};

use crate::{
    data::{
        netex::{GroupOfTariffZones, VersionedRef, DEFAULT_VERSION},
        osm::{MemberType, OsmId, Relation},
    },
    errors::{EntityRef, Error, Result},
};

use super::{tags::GROUP_OF_TARIFF_ZONES_SCHEMA, zones::MappedZones};

/// Maps relations to groups. Must run after every way has been mapped.
pub fn map_relations(relations: &[Relation], zones: &MappedZones) -> Result<Vec<GroupOfTariffZones>> {
    let zone_ids = zones.ids_by_way();
    let groups = relations
        .iter()
        .map(|relation| map_relation(relation, &zone_ids))
        .collect::<Result<Vec<_>>>()?;
    info!(groups = groups.len(); "Mapped relations to groups of tariff zones");
    Ok(groups)
}

/// Way members resolve to the output id of the zone mapped from that way.
pub fn map_relation(relation: &Relation, zone_ids: &HashMap<OsmId, &str>) -> Result<GroupOfTariffZones> {
    let tags = GROUP_OF_TARIFF_ZONES_SCHEMA.interpret(&relation.tags, EntityRef::Relation(relation.id))?;

    let mut members = Vec::with_capacity(relation.members.len());
    for member in &relation.members {
        if member.member_type != MemberType::Way {
            warn!(relation = relation.id, member = member.id; "Skipping relation member which is not a way");
            continue;
        }
        let zone_id = zone_ids.get(&member.id).ok_or(Error::UnresolvedMember {
            relation: relation.id,
            way: member.id,
        })?;
        members.push(VersionedRef {
            reference: zone_id.to_string(),
            version: DEFAULT_VERSION.to_string(),
        });
    }

    Ok(GroupOfTariffZones {
        id: tags.id.unwrap_or_default(),
        version: DEFAULT_VERSION.to_string(),
        name: tags.name,
        private_code: tags.private_code,
        purpose_of_grouping_ref: tags.purpose_of_grouping_ref,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{
            netex::TargetEntity,
            osm::{Member, Node, Tag, Way},
        },
        etl::netex_map::{geometry::NodeIndex, zones::map_ways},
    };

    fn mapped_zones() -> MappedZones {
        let nodes = vec![Node { id: 1, lat: 59.0, lon: 9.0 }];
        let ways: Vec<Way> = [(101, "1"), (102, "2")]
            .iter()
            .map(|(id, code)| Way {
                id: *id,
                nodes: vec![1],
                tags: vec![
                    Tag::new("codespace", "VOT"),
                    Tag::new("id", &format!("VOT:FareZone:{}", code)),
                    Tag::new("privateCode", code),
                ],
            })
            .collect();
        map_ways(&ways, &NodeIndex::new(&nodes).unwrap(), TargetEntity::FareZone).unwrap()
    }

    fn way_member(id: OsmId) -> Member {
        Member {
            member_type: MemberType::Way,
            id,
            role: String::new(),
        }
    }

    fn relation(members: Vec<Member>) -> Relation {
        Relation {
            id: 7,
            members,
            tags: vec![
                Tag::new("GroupOfTariffZoneId", "VOT:GroupOfTariffZones:1"),
                Tag::new("name:nor", "Vestfold"),
                Tag::new("privateCode", "VF"),
                Tag::new("PurposeOfGroupingRef", "VOT:PurposeOfGrouping:County"),
            ],
        }
    }

    #[test]
    fn resolves_members_to_zone_ids_in_member_order() {
        let zones = mapped_zones();
        let group = map_relation(&relation(vec![way_member(102), way_member(101)]), &zones.ids_by_way()).unwrap();

        assert_eq!(group.id, "VOT:GroupOfTariffZones:1");
        assert_eq!(group.version, "1");
        assert_eq!(group.private_code.as_deref(), Some("VF"));
        assert_eq!(group.purpose_of_grouping_ref.as_deref(), Some("VOT:PurposeOfGrouping:County"));
        assert_eq!(
            group.members,
            vec![
                VersionedRef {
                    reference: "VOT:FareZone:2".to_string(),
                    version: "1".to_string(),
                },
                VersionedRef {
                    reference: "VOT:FareZone:1".to_string(),
                    version: "1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn unresolved_way_member_fails() {
        let zones = mapped_zones();
        let err = map_relation(&relation(vec![way_member(101), way_member(999)]), &zones.ids_by_way()).unwrap_err();
        assert!(matches!(err, Error::UnresolvedMember { relation: 7, way: 999 }));
    }

    #[test]
    fn node_members_are_skipped() {
        let zones = mapped_zones();
        let node_member = Member {
            member_type: MemberType::Node,
            id: 101,
            role: "label".to_string(),
        };
        let group = map_relation(&relation(vec![node_member, way_member(101)]), &zones.ids_by_way()).unwrap();
        assert_eq!(group.members.len(), 1);
    }

    #[test]
    fn group_id_is_never_generated() {
        let zones = mapped_zones();
        let mut relation = relation(vec![way_member(101)]);
        relation.tags.retain(|tag| tag.key != "GroupOfTariffZoneId");

        let err = map_relations(&[relation], &zones).unwrap_err();
        assert!(matches!(err, Error::MissingTags(e) if e.tags() == vec!["GroupOfTariffZoneId"]));
    }
}
