use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;

use crate::config::UserConfig;
use crate::data::netex::{PublicationDelivery, SiteFrame, TargetEntity, DEFAULT_VERSION};
use crate::data::OsmMapData;
use crate::errors::Result;

use super::netex_map::map_entity;
use super::parse_osm::read_osm_file;
use super::write_netex::write_publication_delivery;
use super::Etl;

pub const ETL_NAME: &str = "osm_to_netex";

/// Reads one OSM file and writes one NeTEx publication delivery.
pub struct OsmToNetexEtl<'a> {
    config: &'a UserConfig,
    osm_file: &'a Path,
    output_file: &'a Path,
    target: TargetEntity,
}

impl<'a> OsmToNetexEtl<'a> {
    pub fn new(config: &'a UserConfig, osm_file: &'a Path, output_file: &'a Path, target: TargetEntity) -> Self {
        OsmToNetexEtl {
            config,
            osm_file,
            output_file,
            target,
        }
    }
}

impl Etl for OsmToNetexEtl<'_> {
    type Input = OsmMapData;
    type Output = PublicationDelivery;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn extract(&mut self) -> Result<Self::Input> {
        read_osm_file(self.osm_file)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let site_frame = map_entity(&input, self.target)?;
        Ok(publication_delivery(
            self.config,
            &file_name(self.osm_file),
            site_frame,
            Local::now(),
        ))
    }

    fn load(&mut self, output: Self::Output) -> Result<()> {
        if let Some(parent) = self.output_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(self.output_file)?);
        write_publication_delivery(&mut writer, &output)?;
        writer.flush()?;

        let output_file = self.output_file.display().to_string();
        info!(output_file = output_file.as_str(); "Wrote NeTEx file");
        Ok(())
    }
}

/// Wraps a mapped frame with everything that depends on the moment of the run.
pub fn publication_delivery(
    config: &UserConfig,
    input_file_name: &str,
    site_frame: SiteFrame,
    now: DateTime<Local>,
) -> PublicationDelivery {
    PublicationDelivery {
        publication_timestamp: now.naive_local(),
        participant_ref: config.participant_ref.clone(),
        description: format!("Generated by osm-to-netex from file {}", input_file_name),
        frame_id: format!("{}:SiteFrame:{}", config.site_frame_codespace, now.timestamp_millis()),
        frame_version: DEFAULT_VERSION.to_string(),
        frame_created: now.naive_local(),
        default_time_zone: config.default_time_zone.clone(),
        site_frame,
    }
}

/// `<output dir>/<input base name>_<yyyyMMddHHmmss>.xml`
pub fn default_output_file(config: &UserConfig, osm_file: &Path, now: DateTime<Local>) -> PathBuf {
    let without_xz = if osm_file.extension().is_some_and(|ext| ext == "xz") {
        osm_file.with_extension("")
    } else {
        osm_file.to_path_buf()
    };
    let base_name = without_xz
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "netex".to_string());

    config
        .output_dir
        .join(format!("{}_{}.xml", base_name, now.format("%Y%m%d%H%M%S")))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
