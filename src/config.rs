use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::Result;

/// Settings that rarely change between runs. Every field has a default, so the
/// config file is optional and may be partial.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UserConfig {
    pub output_dir: PathBuf,
    pub participant_ref: String,
    pub site_frame_codespace: String,
    pub default_time_zone: String,
    pub log_level: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            output_dir: PathBuf::from("target"),
            participant_ref: "osm-to-netex".to_string(),
            site_frame_codespace: "OSM".to_string(),
            default_time_zone: "Europe/Paris".to_string(),
            log_level: "info".to_string(),
        }
    }
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: UserConfig =
            serde_json::from_str(r#"{"outputDir": "out", "siteFrameCodespace": "VOT"}"#).unwrap();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.site_frame_codespace, "VOT");
        assert_eq!(config.participant_ref, "osm-to-netex");
        assert_eq!(config.default_time_zone, "Europe/Paris");
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let err = serde_json::from_str::<UserConfig>(r#"{"logLevel": 3}"#).unwrap_err();
        assert!(err.is_data());
    }
}
