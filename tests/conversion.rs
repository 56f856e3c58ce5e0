use std::path::Path;

use chrono::{Local, TimeZone};

use osm_to_netex::config::UserConfig;
use osm_to_netex::data::netex::{Zone, ZoneRecord};
use osm_to_netex::errors::Error;
use osm_to_netex::etl::netex_map::map;
use osm_to_netex::etl::osm_to_netex::publication_delivery;
use osm_to_netex::etl::parse_osm::read_osm_file;
use osm_to_netex::etl::write_netex::write_publication_delivery;

fn fixture() -> osm_to_netex::data::OsmMapData {
    read_osm_file(&Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/osm.xml")).unwrap()
}

fn convert(target_entity: &str) -> String {
    let site_frame = map(&fixture(), target_entity).unwrap();
    let now = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let delivery = publication_delivery(&UserConfig::default(), "osm.xml", site_frame, now);

    let mut output = Vec::new();
    write_publication_delivery(&mut output, &delivery).unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn converts_tariff_zones() {
    let xml = convert("TariffZone");

    assert!(xml.contains(r#"<TariffZone version="1" id="VOT:TariffZone:630">"#));
    assert!(xml.contains(r#"<TariffZone version="1" id="VOT:TariffZone:710">"#));
    assert!(xml.contains("<Key>zone_type</Key>"));
    assert!(xml.contains("<ToDate>2030-12-31T00:00:00</ToDate>"));
    assert!(xml.contains("<gml:posList>59.6689 9.6502 59.6712 9.6631 59.6598 9.6704 59.6689 9.6502</gml:posList>"));
    assert!(!xml.contains("groupsOfTariffZones"));
}

#[test]
fn converts_fare_zones_with_groups() {
    let xml = convert("FareZone");

    assert!(xml.contains(r#"<FareZone version="1" id="VOT:FareZone:19">"#));
    assert!(xml.contains("<Value>VOT:TariffZone:630</Value>"));
    assert!(xml.contains("<Value>VOT:TariffZone:7100</Value>"));
    assert!(xml.contains(r#"<AuthorityRef ref="VOT:Authority:VTFK_ID"/>"#));

    let first = xml.find(r#"<TariffZoneRef version="1" ref="VOT:FareZone:20"/>"#).unwrap();
    let second = xml.find(r#"<TariffZoneRef version="1" ref="VOT:FareZone:19"/>"#).unwrap();
    assert!(first < second);
}

#[test]
fn converts_topographic_places() {
    let xml = convert("TopographicPlace");

    assert!(xml.contains("<topographicPlaces>"));
    assert!(xml.contains(r#"<TopographicPlace version="1" id="VOT:TopographicPlace:630">"#));
    assert!(xml.contains("<Descriptor>"));
}

#[test]
fn mapping_twice_gives_the_same_zones() {
    let osm = fixture();
    let first = map(&osm, "FareZone").unwrap();
    let second = map(&osm, "FareZone").unwrap();

    assert_eq!(first, second);
    let ids: Vec<&str> = first.zones.iter().map(Zone::id).collect();
    assert_eq!(ids, vec!["VOT:FareZone:19", "VOT:FareZone:20"]);
}

#[test]
fn missing_codespace_names_only_that_tag() {
    let mut osm = fixture();
    osm.ways[1].tags.retain(|tag| tag.key != "codespace");

    match map(&osm, "TariffZone") {
        Err(Error::MissingTags(errors)) => assert_eq!(errors.tags(), vec!["codespace"]),
        other => panic!("expected missing tags, got {:?}", other.map(|frame| frame.zones.len())),
    }
}
