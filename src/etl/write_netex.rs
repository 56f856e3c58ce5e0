use std::io::Write;

use chrono::NaiveDateTime;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::data::netex::{
    FareZone, GroupOfTariffZones, KeyValue, MultilingualString, Polygon, PublicationDelivery,
    TargetEntity, TopographicPlace, ValidBetween, Zone, ZoneCommon,
};
use crate::errors::Result;

const NETEX_NAMESPACE: &str = "http://www.netex.org.uk/netex";
const GML_NAMESPACE: &str = "http://www.opengis.net/gml/3.2";
const NETEX_VERSION: &str = "1.15";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Writes the delivery as an indented NeTEx document.
pub fn write_publication_delivery<W: Write>(output: W, delivery: &PublicationDelivery) -> Result<()> {
    let mut writer = Writer::new_with_indent(output, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    start(
        &mut writer,
        "PublicationDelivery",
        &[("xmlns", NETEX_NAMESPACE), ("xmlns:gml", GML_NAMESPACE), ("version", NETEX_VERSION)],
    )?;
    text_element(&mut writer, "PublicationTimestamp", &[], &format_date_time(&delivery.publication_timestamp))?;
    text_element(&mut writer, "ParticipantRef", &[], &delivery.participant_ref)?;
    text_element(&mut writer, "Description", &[], &delivery.description)?;

    start(&mut writer, "dataObjects", &[])?;
    let created = format_date_time(&delivery.frame_created);
    start(
        &mut writer,
        "SiteFrame",
        &[("created", created.as_str()), ("version", delivery.frame_version.as_str()), ("id", delivery.frame_id.as_str())],
    )?;
    start(&mut writer, "FrameDefaults", &[])?;
    start(&mut writer, "DefaultLocale", &[])?;
    text_element(&mut writer, "TimeZone", &[], &delivery.default_time_zone)?;
    end(&mut writer, "DefaultLocale")?;
    end(&mut writer, "FrameDefaults")?;

    let frame = &delivery.site_frame;
    let collection = match frame.target {
        TargetEntity::TopographicPlace => "topographicPlaces",
        TargetEntity::TariffZone | TargetEntity::FareZone => "tariffZones",
    };
    start(&mut writer, collection, &[])?;
    for zone in &frame.zones {
        write_zone(&mut writer, zone)?;
    }
    end(&mut writer, collection)?;

    if let Some(groups) = &frame.groups_of_tariff_zones {
        start(&mut writer, "groupsOfTariffZones", &[])?;
        for group in groups {
            write_group(&mut writer, group)?;
        }
        end(&mut writer, "groupsOfTariffZones")?;
    }

    end(&mut writer, "SiteFrame")?;
    end(&mut writer, "dataObjects")?;
    end(&mut writer, "PublicationDelivery")?;
    Ok(())
}

fn write_zone<W: Write>(writer: &mut Writer<W>, zone: &Zone) -> Result<()> {
    match zone {
        Zone::Tariff(tariff_zone) => {
            start_zone(writer, "TariffZone", &tariff_zone.common)?;
            write_polygon(writer, &tariff_zone.common)?;
            end(writer, "TariffZone")
        }
        Zone::TopographicPlace(place) => write_topographic_place(writer, place),
        Zone::Fare(fare_zone) => write_fare_zone(writer, fare_zone),
    }
}

fn write_topographic_place<W: Write>(writer: &mut Writer<W>, place: &TopographicPlace) -> Result<()> {
    start_zone(writer, "TopographicPlace", &place.common)?;
    write_polygon(writer, &place.common)?;
    if let Some(descriptor) = &place.descriptor {
        start(writer, "Descriptor", &[])?;
        write_name(writer, descriptor)?;
        end(writer, "Descriptor")?;
    }
    end(writer, "TopographicPlace")
}

fn write_fare_zone<W: Write>(writer: &mut Writer<W>, fare_zone: &FareZone) -> Result<()> {
    start_zone(writer, "FareZone", &fare_zone.common)?;
    text_element(writer, "PrivateCode", &[], &fare_zone.private_code)?;
    write_polygon(writer, &fare_zone.common)?;
    if let Some(members) = &fare_zone.members {
        start(writer, "members", &[])?;
        for member in members {
            empty(writer, "ScheduledStopPointRef", &[("ref", member.as_str())])?;
        }
        end(writer, "members")?;
    }
    if let Some(zone_topology) = fare_zone.zone_topology {
        text_element(writer, "ZoneTopology", &[], zone_topology.as_str())?;
    }
    if let Some(scoping_method) = fare_zone.scoping_method {
        text_element(writer, "ScopingMethod", &[], scoping_method.as_str())?;
    }
    if let Some(authority_ref) = &fare_zone.authority_ref {
        empty(writer, "AuthorityRef", &[("ref", authority_ref.as_str())])?;
    }
    if let Some(neighbours) = &fare_zone.neighbours {
        start(writer, "neighbours", &[])?;
        for neighbour in neighbours {
            empty(writer, "FareZoneRef", &[("ref", neighbour.as_str())])?;
        }
        end(writer, "neighbours")?;
    }
    end(writer, "FareZone")
}

fn write_group<W: Write>(writer: &mut Writer<W>, group: &GroupOfTariffZones) -> Result<()> {
    start(writer, "GroupOfTariffZones", &[("version", group.version.as_str()), ("id", group.id.as_str())])?;
    if let Some(name) = &group.name {
        write_name(writer, name)?;
    }
    if let Some(purpose) = &group.purpose_of_grouping_ref {
        empty(writer, "PurposeOfGroupingRef", &[("ref", purpose.as_str())])?;
    }
    if let Some(private_code) = &group.private_code {
        text_element(writer, "PrivateCode", &[], private_code)?;
    }
    start(writer, "members", &[])?;
    for member in &group.members {
        empty(writer, "TariffZoneRef", &[("version", member.version.as_str()), ("ref", member.reference.as_str())])?;
    }
    end(writer, "members")?;
    end(writer, "GroupOfTariffZones")
}

/// Opens the zone element and writes the fields every variant shares, up to the name.
fn start_zone<W: Write>(writer: &mut Writer<W>, element: &str, common: &ZoneCommon) -> Result<()> {
    start(writer, element, &[("version", common.version.as_str()), ("id", common.id.as_str())])?;
    if let Some(valid_between) = &common.valid_between {
        write_valid_between(writer, valid_between)?;
    }
    if !common.key_list.is_empty() {
        write_key_list(writer, &common.key_list)?;
    }
    if let Some(name) = &common.name {
        write_name(writer, name)?;
    }
    Ok(())
}

fn write_valid_between<W: Write>(writer: &mut Writer<W>, valid_between: &ValidBetween) -> Result<()> {
    start(writer, "ValidBetween", &[])?;
    text_element(writer, "FromDate", &[], &format_date_time(&valid_between.from_date))?;
    if let Some(to_date) = &valid_between.to_date {
        text_element(writer, "ToDate", &[], &format_date_time(to_date))?;
    }
    end(writer, "ValidBetween")
}

fn write_key_list<W: Write>(writer: &mut Writer<W>, key_list: &[KeyValue]) -> Result<()> {
    start(writer, "keyList", &[])?;
    for key_value in key_list {
        start(writer, "KeyValue", &[])?;
        text_element(writer, "Key", &[], &key_value.key)?;
        text_element(writer, "Value", &[], &key_value.value)?;
        end(writer, "KeyValue")?;
    }
    end(writer, "keyList")
}

fn write_name<W: Write>(writer: &mut Writer<W>, name: &MultilingualString) -> Result<()> {
    match &name.lang {
        Some(lang) => text_element(writer, "Name", &[("lang", lang.as_str())], &name.value),
        None => text_element(writer, "Name", &[], &name.value),
    }
}

fn write_polygon<W: Write>(writer: &mut Writer<W>, common: &ZoneCommon) -> Result<()> {
    let Some(Polygon { id, exterior }) = &common.polygon else {
        return Ok(());
    };
    let pos_list = exterior
        .iter()
        .map(|coordinate| coordinate.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    start(writer, "gml:Polygon", &[("gml:id", id.as_str())])?;
    start(writer, "gml:exterior", &[])?;
    start(writer, "gml:LinearRing", &[])?;
    text_element(writer, "gml:posList", &[], &pos_list)?;
    end(writer, "gml:LinearRing")?;
    end(writer, "gml:exterior")?;
    end(writer, "gml:Polygon")
}

fn format_date_time(date_time: &NaiveDateTime) -> String {
    date_time.format(DATE_TIME_FORMAT).to_string()
}

fn element<'a>(name: &'a str, attributes: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut element = BytesStart::new(name);
    for attribute in attributes {
        element.push_attribute(*attribute);
    }
    element
}

fn start<W: Write>(writer: &mut Writer<W>, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
    writer.write_event(Event::Start(element(name, attributes)))?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn empty<W: Write>(writer: &mut Writer<W>, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
    writer.write_event(Event::Empty(element(name, attributes)))?;
    Ok(())
}

fn text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(element(name, attributes)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
