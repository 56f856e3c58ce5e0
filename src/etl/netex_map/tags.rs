use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};

use crate::{
    data::{
        netex::{KeyValue, MultilingualString, ScopingMethod, ValidBetween, ZoneTopology},
        osm::Tag,
    },
    errors::{EntityRef, Result},
};

use super::validation::{is_set, RequiredTag, TagErrorCollector};

pub const CODESPACE: &str = "codespace";
pub const NAME: &str = "name";
pub const REFERENCE: &str = "reference";
pub const ZONE_TYPE: &str = "zone_type";
pub const VALID_FROM: &str = "valid_from";
pub const VALID_TO: &str = "valid_to";
pub const FARE_ZONE_ID: &str = "id";
pub const AUTHORITY_REF: &str = "authorityRef";
pub const MEMBERS: &str = "members";
pub const NEIGHBOURS: &str = "neighbours";
pub const PRIVATE_CODE: &str = "privateCode";
pub const SCOPING_METHOD: &str = "scopingMethod";
pub const ZONE_TOPOLOGY: &str = "zoneTopology";
pub const TZ_MAPPING: &str = "tzMapping";
pub const GROUP_OF_TARIFF_ZONES_ID: &str = "GroupOfTariffZoneId";
pub const PURPOSE_OF_GROUPING_REF: &str = "PurposeOfGroupingRef";

const DATE_FORMAT: &str = "%Y-%m-%d";
const LIST_SEPARATOR: char = ';';

#[derive(Debug, Clone, Copy)]
pub enum KeyMatcher {
    Exact(&'static str),
    Prefix(&'static str),
}

impl KeyMatcher {
    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyMatcher::Exact(expected) => key == *expected,
            KeyMatcher::Prefix(prefix) => key.starts_with(prefix),
        }
    }
}

pub type TagHandler<T> = fn(&mut T, &Tag, &mut TagErrorCollector);

pub struct TagRule<T> {
    pub matcher: KeyMatcher,
    pub handler: TagHandler<T>,
}

/// How one output variant reads its tags: the first rule whose matcher accepts a
/// key handles that tag, then the required tags are checked.
pub struct TagSchema<T: 'static> {
    pub rules: &'static [TagRule<T>],
    pub required: &'static [RequiredTag<T>],
}

impl<T: Default + 'static> TagSchema<T> {
    pub fn interpret(&self, tags: &[Tag], entity: EntityRef) -> Result<T> {
        let mut values = T::default();
        let mut errors = TagErrorCollector::default();

        for tag in tags {
            match self.rules.iter().find(|rule| rule.matcher.matches(&tag.key)) {
                Some(rule) => (rule.handler)(&mut values, tag, &mut errors),
                None => debug!(entity = entity.to_string().as_str(), key = tag.key.as_str(); "Ignoring tag"),
            }
        }

        errors.check_required(&values, self.required);
        errors.into_result(entity)?;
        Ok(values)
    }
}

/// Values read from the tags of a way.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ZoneTags {
    pub codespace: Option<String>,
    pub reference: Option<String>,
    pub fare_zone_id: Option<String>,
    pub private_code: Option<String>,
    pub name: Option<MultilingualString>,
    pub valid_from: Option<NaiveDateTime>,
    pub valid_to: Option<NaiveDateTime>,
    pub key_list: Vec<KeyValue>,
    pub authority_ref: Option<String>,
    pub scoping_method: Option<ScopingMethod>,
    pub zone_topology: Option<ZoneTopology>,
    pub members: Option<Vec<String>>,
    pub neighbours: Option<Vec<String>>,
    pub tz_mapping: Option<String>,
}

impl ZoneTags {
    pub fn valid_between(&self) -> Option<ValidBetween> {
        match (self.valid_from, self.valid_to) {
            (Some(from_date), Some(to_date)) if to_date > from_date => {
                debug!("Set validity from and to date");
                Some(ValidBetween {
                    from_date,
                    to_date: Some(to_date),
                })
            }
            (Some(from_date), _) => {
                debug!("Set validity only from date");
                Some(ValidBetween {
                    from_date,
                    to_date: None,
                })
            }
            _ => None,
        }
    }
}

/// Values read from the tags of a relation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GroupTags {
    pub id: Option<String>,
    pub name: Option<MultilingualString>,
    pub private_code: Option<String>,
    pub purpose_of_grouping_ref: Option<String>,
}

pub const TARIFF_ZONE_SCHEMA: TagSchema<ZoneTags> = TagSchema {
    rules: &[
        TagRule { matcher: KeyMatcher::Exact(CODESPACE), handler: |z, t, _| z.codespace = Some(t.value.clone()) },
        TagRule { matcher: KeyMatcher::Prefix(NAME), handler: |z, t, _| z.name = Some(localized_name(t)) },
        TagRule { matcher: KeyMatcher::Exact(REFERENCE), handler: |z, t, _| z.reference = Some(t.value.clone()) },
        TagRule { matcher: KeyMatcher::Prefix(ZONE_TYPE), handler: zone_type },
        TagRule { matcher: KeyMatcher::Exact(VALID_FROM), handler: |z, t, _| z.valid_from = parse_date(t) },
        TagRule { matcher: KeyMatcher::Exact(VALID_TO), handler: |z, t, _| z.valid_to = parse_date(t) },
    ],
    required: &[
        RequiredTag { tag: CODESPACE, present: |z| is_set(&z.codespace) },
        RequiredTag { tag: REFERENCE, present: |z| is_set(&z.reference) },
    ],
};

/// Topographic places read the same tags as tariff zones.
pub const TOPOGRAPHIC_PLACE_SCHEMA: TagSchema<ZoneTags> = TARIFF_ZONE_SCHEMA;

pub const FARE_ZONE_SCHEMA: TagSchema<ZoneTags> = TagSchema {
    rules: &[
        TagRule { matcher: KeyMatcher::Exact(CODESPACE), handler: |z, t, _| z.codespace = Some(t.value.clone()) },
        TagRule { matcher: KeyMatcher::Prefix(NAME), handler: |z, t, _| z.name = Some(localized_name(t)) },
        TagRule { matcher: KeyMatcher::Prefix(AUTHORITY_REF), handler: authority_ref },
        TagRule { matcher: KeyMatcher::Prefix(PRIVATE_CODE), handler: |z, t, _| z.private_code = Some(t.value.clone()) },
        TagRule { matcher: KeyMatcher::Prefix(ZONE_TOPOLOGY), handler: zone_topology },
        TagRule { matcher: KeyMatcher::Prefix(SCOPING_METHOD), handler: scoping_method },
        TagRule { matcher: KeyMatcher::Prefix(MEMBERS), handler: |z, t, _| z.members = split_list(&t.value) },
        TagRule { matcher: KeyMatcher::Prefix(NEIGHBOURS), handler: |z, t, _| z.neighbours = split_list(&t.value) },
        TagRule { matcher: KeyMatcher::Exact(VALID_FROM), handler: |z, t, _| z.valid_from = parse_date(t) },
        TagRule { matcher: KeyMatcher::Exact(VALID_TO), handler: |z, t, _| z.valid_to = parse_date(t) },
        TagRule { matcher: KeyMatcher::Exact(FARE_ZONE_ID), handler: |z, t, _| z.fare_zone_id = Some(t.value.clone()) },
        TagRule { matcher: KeyMatcher::Prefix(TZ_MAPPING), handler: |z, t, _| z.tz_mapping = Some(t.value.clone()) },
    ],
    required: &[
        RequiredTag { tag: CODESPACE, present: |z| is_set(&z.codespace) },
        RequiredTag { tag: FARE_ZONE_ID, present: |z| is_set(&z.fare_zone_id) },
        RequiredTag { tag: PRIVATE_CODE, present: |z| is_set(&z.private_code) },
    ],
};

pub const GROUP_OF_TARIFF_ZONES_SCHEMA: TagSchema<GroupTags> = TagSchema {
    rules: &[
        TagRule { matcher: KeyMatcher::Exact(GROUP_OF_TARIFF_ZONES_ID), handler: |g, t, _| g.id = Some(t.value.clone()) },
        TagRule { matcher: KeyMatcher::Prefix(NAME), handler: |g, t, _| g.name = Some(localized_name(t)) },
        TagRule { matcher: KeyMatcher::Prefix(PRIVATE_CODE), handler: |g, t, _| g.private_code = Some(t.value.clone()) },
        TagRule {
            matcher: KeyMatcher::Prefix(PURPOSE_OF_GROUPING_REF),
            handler: |g, t, _| g.purpose_of_grouping_ref = Some(t.value.clone()),
        },
    ],
    required: &[RequiredTag { tag: GROUP_OF_TARIFF_ZONES_ID, present: |g| is_set(&g.id) }],
};

/// `name:nor=Kongsberg` is a Norwegian name. A bare `name` key has no language.
pub fn localized_name(tag: &Tag) -> MultilingualString {
    MultilingualString {
        value: tag.value.clone(),
        lang: tag
            .key
            .rsplit_once(':')
            .map(|(_, lang)| lang.to_string())
            .filter(|lang| !lang.is_empty()),
    }
}

/// Unparseable dates are not fatal: the bound is left unset.
fn parse_date(tag: &Tag) -> Option<NaiveDateTime> {
    match NaiveDate::parse_from_str(tag.value.trim(), DATE_FORMAT) {
        Ok(date) => date.and_hms_opt(0, 0, 0),
        Err(err) => {
            info!(key = tag.key.as_str(), value = tag.value.as_str(), err = err.to_string().as_str();
                "Unable to parse date, leaving it unset");
            None
        }
    }
}

fn split_list(value: &str) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn zone_type(zone: &mut ZoneTags, tag: &Tag, errors: &mut TagErrorCollector) {
    if tag.value.is_empty() {
        errors.missing(ZONE_TYPE);
        return;
    }
    zone.key_list.push(KeyValue {
        key: tag.key.clone(),
        value: tag.value.clone(),
    });
}

fn authority_ref(zone: &mut ZoneTags, tag: &Tag, errors: &mut TagErrorCollector) {
    if tag.value.is_empty() {
        errors.missing(AUTHORITY_REF);
        return;
    }
    zone.authority_ref = Some(tag.value.clone());
}

fn scoping_method(zone: &mut ZoneTags, tag: &Tag, errors: &mut TagErrorCollector) {
    match tag.value.parse() {
        Ok(method) => zone.scoping_method = Some(method),
        Err(()) => errors.invalid(SCOPING_METHOD, &tag.value),
    }
}

fn zone_topology(zone: &mut ZoneTags, tag: &Tag, errors: &mut TagErrorCollector) {
    match tag.value.parse() {
        Ok(topology) => zone.zone_topology = Some(topology),
        Err(()) => errors.invalid(ZONE_TOPOLOGY, &tag.value),
    }
}
