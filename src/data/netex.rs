use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::errors::Error;

pub const DEFAULT_VERSION: &str = "1";

/// Which kind of NeTEx zone every way in the input is mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEntity {
    TariffZone,
    FareZone,
    TopographicPlace,
}

impl TargetEntity {
    /// Element name, also used as the type segment of generated ids.
    pub fn type_name(&self) -> &'static str {
        match self {
            TargetEntity::TariffZone => "TariffZone",
            TargetEntity::FareZone => "FareZone",
            TargetEntity::TopographicPlace => "TopographicPlace",
        }
    }
}

impl FromStr for TargetEntity {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "TariffZone" => Ok(TargetEntity::TariffZone),
            "FareZone" => Ok(TargetEntity::FareZone),
            "TopographicPlace" => Ok(TargetEntity::TopographicPlace),
            _ => Err(Error::UnknownTargetEntity(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultilingualString {
    pub value: String,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBetween {
    pub from_date: NaiveDateTime,
    pub to_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// GML polygon with a single exterior ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub id: String,
    /// Flattened `lat, lon, lat, lon, ...` in node order.
    pub exterior: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopingMethod {
    ExplicitStops,
    ImplicitSpatialProjection,
    ExplicitPeripheryStops,
    Other,
}

impl ScopingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopingMethod::ExplicitStops => "explicitStops",
            ScopingMethod::ImplicitSpatialProjection => "implicitSpatialProjection",
            ScopingMethod::ExplicitPeripheryStops => "explicitPeripheryStops",
            ScopingMethod::Other => "other",
        }
    }
}

impl FromStr for ScopingMethod {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "explicitStops" => Ok(ScopingMethod::ExplicitStops),
            "implicitSpatialProjection" => Ok(ScopingMethod::ImplicitSpatialProjection),
            "explicitPeripheryStops" => Ok(ScopingMethod::ExplicitPeripheryStops),
            "other" => Ok(ScopingMethod::Other),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneTopology {
    Overlapping,
    Honeycomb,
    Ring,
    Annular,
    Nested,
    Tiled,
    Sequence,
    OverlappingSequence,
    Other,
}

impl ZoneTopology {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneTopology::Overlapping => "overlapping",
            ZoneTopology::Honeycomb => "honeycomb",
            ZoneTopology::Ring => "ring",
            ZoneTopology::Annular => "annular",
            ZoneTopology::Nested => "nested",
            ZoneTopology::Tiled => "tiled",
            ZoneTopology::Sequence => "sequence",
            ZoneTopology::OverlappingSequence => "overlappingSequence",
            ZoneTopology::Other => "other",
        }
    }
}

impl FromStr for ZoneTopology {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "overlapping" => Ok(ZoneTopology::Overlapping),
            "honeycomb" => Ok(ZoneTopology::Honeycomb),
            "ring" => Ok(ZoneTopology::Ring),
            "annular" => Ok(ZoneTopology::Annular),
            "nested" => Ok(ZoneTopology::Nested),
            "tiled" => Ok(ZoneTopology::Tiled),
            "sequence" => Ok(ZoneTopology::Sequence),
            "overlappingSequence" => Ok(ZoneTopology::OverlappingSequence),
            "other" => Ok(ZoneTopology::Other),
            _ => Err(()),
        }
    }
}

/// Fields every zone variant carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCommon {
    pub id: String,
    pub version: String,
    pub name: Option<MultilingualString>,
    pub valid_between: Option<ValidBetween>,
    pub key_list: Vec<KeyValue>,
    pub polygon: Option<Polygon>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TariffZone {
    pub common: ZoneCommon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopographicPlace {
    pub common: ZoneCommon,
    pub descriptor: Option<MultilingualString>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FareZone {
    pub common: ZoneCommon,
    pub private_code: String,
    pub scoping_method: Option<ScopingMethod>,
    pub zone_topology: Option<ZoneTopology>,
    pub authority_ref: Option<String>,
    /// Scheduled stop point refs.
    pub members: Option<Vec<String>>,
    /// Fare zone refs.
    pub neighbours: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Zone {
    Tariff(TariffZone),
    Fare(FareZone),
    TopographicPlace(TopographicPlace),
}

pub trait ZoneRecord {
    fn common(&self) -> &ZoneCommon;

    fn id(&self) -> &str {
        &self.common().id
    }

    fn version(&self) -> &str {
        &self.common().version
    }

    fn name(&self) -> Option<&MultilingualString> {
        self.common().name.as_ref()
    }

    fn valid_between(&self) -> Option<&ValidBetween> {
        self.common().valid_between.as_ref()
    }
}

impl ZoneRecord for TariffZone {
    fn common(&self) -> &ZoneCommon {
        &self.common
    }
}

impl ZoneRecord for FareZone {
    fn common(&self) -> &ZoneCommon {
        &self.common
    }
}

impl ZoneRecord for TopographicPlace {
    fn common(&self) -> &ZoneCommon {
        &self.common
    }
}

impl ZoneRecord for Zone {
    fn common(&self) -> &ZoneCommon {
        match self {
            Zone::Tariff(zone) => zone.common(),
            Zone::Fare(zone) => zone.common(),
            Zone::TopographicPlace(zone) => zone.common(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedRef {
    pub reference: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOfTariffZones {
    pub id: String,
    pub version: String,
    pub name: Option<MultilingualString>,
    pub private_code: Option<String>,
    pub purpose_of_grouping_ref: Option<String>,
    pub members: Vec<VersionedRef>,
}

/// Mapped contents of one site frame. Zones of every variant share the frame; the
/// target entity decides which collection they are written to.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteFrame {
    pub target: TargetEntity,
    pub zones: Vec<Zone>,
    pub groups_of_tariff_zones: Option<Vec<GroupOfTariffZones>>,
}

/// Envelope around a site frame, holding everything that depends on when and where
/// the conversion ran.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicationDelivery {
    pub publication_timestamp: NaiveDateTime,
    pub participant_ref: String,
    pub description: String,
    pub frame_id: String,
    pub frame_version: String,
    pub frame_created: NaiveDateTime,
    pub default_time_zone: String,
    pub site_frame: SiteFrame,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_target_entities() {
        assert_eq!("FareZone".parse::<TargetEntity>().unwrap(), TargetEntity::FareZone);
        assert_eq!("TariffZone".parse::<TargetEntity>().unwrap(), TargetEntity::TariffZone);
        assert_eq!(
            "TopographicPlace".parse::<TargetEntity>().unwrap(),
            TargetEntity::TopographicPlace
        );
    }

    #[test]
    fn rejects_unknown_target_entity() {
        let err = "StopPlace".parse::<TargetEntity>().unwrap_err();
        assert!(matches!(err, Error::UnknownTargetEntity(name) if name == "StopPlace"));
    }

    #[test]
    fn enumerations_round_trip_through_their_names() {
        for value in ["explicitStops", "implicitSpatialProjection", "explicitPeripheryStops", "other"] {
            assert_eq!(value.parse::<ScopingMethod>().unwrap().as_str(), value);
        }
        assert_eq!("tiled".parse::<ZoneTopology>(), Ok(ZoneTopology::Tiled));
        assert!("explicit".parse::<ScopingMethod>().is_err());
    }
}
