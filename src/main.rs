use std::io;
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use log::info;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use osm_to_netex::config::{load_user_config, UserConfig};
use osm_to_netex::data::netex::TargetEntity;
use osm_to_netex::errors::Result;
use osm_to_netex::etl::osm_to_netex::{default_output_file, OsmToNetexEtl};
use osm_to_netex::etl::Etl;

/// Convert OSM ways and relations to NeTEx zones.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Osm file to convert from (.osm or .osm.xz)
    #[arg(long, alias = "osmFile")]
    osm_file: PathBuf,

    /// Target entity. TariffZone, FareZone or TopographicPlace
    #[arg(long, alias = "targetEntity")]
    target_entity: String,

    /// Netex file name to write. Defaults to <osm file>_<timestamp>.xml in the output dir
    #[arg(long, alias = "netexOutputFile")]
    netex_output_file: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let user_config = match &cli.config {
        Some(path) => load_user_config(path)?,
        None => UserConfig::default(),
    };
    setup_logging(&user_config.log_level);

    let target: TargetEntity = cli.target_entity.parse()?;
    let output_file = cli
        .netex_output_file
        .clone()
        .unwrap_or_else(|| default_output_file(&user_config, &cli.osm_file, Local::now()));

    let osm_file = cli.osm_file.display().to_string();
    info!(osm_file = osm_file.as_str(), target_entity = target.type_name(); "Got osm file");

    let mut etl = OsmToNetexEtl::new(&user_config, &cli.osm_file, &output_file, target);
    etl.process()
}
