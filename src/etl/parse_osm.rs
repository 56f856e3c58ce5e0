use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::info;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::osm::{Member, MemberType, Node, OsmId, Relation, Tag, Way};
use crate::data::OsmMapData;
use crate::errors::{Error, Result};

enum ParserState {
    Top,
    Node,
    Way(Way),
    Relation(Relation),
}

/// Reads an .osm file, decompressing it first when it ends in `.xz`.
pub fn read_osm_file(path: &Path) -> Result<OsmMapData> {
    let file_reader = BufReader::new(fs::File::open(path)?);
    let osm = if path.extension().is_some_and(|ext| ext == "xz") {
        let xz_reader = XzDecoder::new(file_reader);
        read_osm(BufReader::new(xz_reader))?
    } else {
        read_osm(file_reader)?
    };

    info!(
        generator = osm.generator.as_deref().unwrap_or("unknown"),
        version = osm.version.as_deref().unwrap_or("unknown"),
        nodes = osm.nodes.len(),
        ways = osm.ways.len(),
        relations = osm.relations.len();
        "Read OSM file"
    );
    Ok(osm)
}

pub fn read_osm<R: BufRead>(input: R) -> Result<OsmMapData> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut osm = OsmMapData::default();
    let mut state = ParserState::Top;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => state = start_element(&mut osm, state, &e)?,
            Event::Empty(e) => {
                state = start_element(&mut osm, state, &e)?;
                state = end_element(&mut osm, state, e.name().as_ref());
            }
            Event::End(e) => state = end_element(&mut osm, state, e.name().as_ref()),
            Event::Text(_) => return Err(Error::MalformedOsm("Didn't expect to see text in OSM file".to_string())),
            Event::Decl(_) | Event::Comment(_) | Event::CData(_) | Event::PI(_) | Event::DocType(_) => (),
        }
        // if we don't keep a borrow elsewhere, we can clear the buffer to keep memory usage low
        buf.clear();
    }

    Ok(osm)
}

fn start_element(osm: &mut OsmMapData, state: ParserState, e: &BytesStart) -> Result<ParserState> {
    let state = match (state, e.name().as_ref()) {
        (ParserState::Top, b"osm") => {
            osm.generator = optional_attribute(e, b"generator")?;
            osm.version = optional_attribute(e, b"version")?;
            ParserState::Top
        }
        (ParserState::Top, b"node") => {
            osm.nodes.push(parse_node(e)?);
            ParserState::Node
        }
        (ParserState::Top, b"way") => ParserState::Way(Way {
            id: required_attribute(e, b"id")?,
            ..Default::default()
        }),
        (ParserState::Top, b"relation") => ParserState::Relation(Relation {
            id: required_attribute(e, b"id")?,
            ..Default::default()
        }),
        (ParserState::Way(mut way), b"nd") => {
            way.nodes.push(required_attribute(e, b"ref")?);
            ParserState::Way(way)
        }
        (ParserState::Way(mut way), b"tag") => {
            way.tags.push(parse_tag(e)?);
            ParserState::Way(way)
        }
        (ParserState::Relation(mut relation), b"member") => {
            relation.members.push(parse_member(e)?);
            ParserState::Relation(relation)
        }
        (ParserState::Relation(mut relation), b"tag") => {
            relation.tags.push(parse_tag(e)?);
            ParserState::Relation(relation)
        }
        // Node tags, bounds and anything else we do not map.
        (state, _) => state,
    };
    Ok(state)
}

fn end_element(osm: &mut OsmMapData, state: ParserState, name: &[u8]) -> ParserState {
    match (state, name) {
        (ParserState::Node, b"node") => ParserState::Top,
        (ParserState::Way(way), b"way") => {
            osm.ways.push(way);
            ParserState::Top
        }
        (ParserState::Relation(relation), b"relation") => {
            osm.relations.push(relation);
            ParserState::Top
        }
        (state, _) => state,
    }
}

fn parse_node(e: &BytesStart) -> Result<Node> {
    Ok(Node {
        id: required_attribute(e, b"id")?,
        lat: required_attribute(e, b"lat")?,
        lon: required_attribute(e, b"lon")?,
    })
}

fn parse_tag(e: &BytesStart) -> Result<Tag> {
    Ok(Tag {
        key: required_attribute(e, b"k")?,
        value: optional_attribute(e, b"v")?.unwrap_or_default(),
    })
}

fn parse_member(e: &BytesStart) -> Result<Member> {
    let type_name: String = required_attribute(e, b"type")?;
    let member_type = MemberType::parse(&type_name)
        .ok_or_else(|| Error::MalformedOsm(format!("Unknown member type {}", type_name)))?;
    let id: OsmId = required_attribute(e, b"ref")?;
    Ok(Member {
        member_type,
        id,
        role: optional_attribute(e, b"role")?.unwrap_or_default(),
    })
}

fn optional_attribute(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attribute_res in e.attributes() {
        let attribute = attribute_res?;
        if attribute.key.as_ref() == key {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn required_attribute<T: FromStr>(e: &BytesStart, key: &[u8]) -> Result<T> {
    let element = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let attribute = String::from_utf8_lossy(key).into_owned();
    let value = optional_attribute(e, key)?
        .ok_or_else(|| Error::MalformedOsm(format!("<{}> is missing attribute {}", element, attribute)))?;
    value.parse().map_err(|_| {
        Error::MalformedOsm(format!("<{}> has invalid {} attribute '{}'", element, attribute, value))
    })
}
