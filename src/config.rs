use std::collections::HashMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub icons: IconConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub boundaries: PathBuf, // .geojson/.json or .shp
    #[serde(default = "default_name_field")]
    pub name_field: String,
    #[serde(default = "default_borough_field")]
    pub borough_field: String,
    pub mapping_file: Option<PathBuf>, // JSON override for the built-in table
}

fn default_name_field() -> String {
    "NTAName".to_string()
}

fn default_borough_field() -> String {
    "BoroName".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub cleaned: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CheckConfig {
    pub neighborhoods_csv: Option<PathBuf>, // roster CSV with a "slug" column
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IconConfig {
    pub shapes_url: Option<String>, // fetch over HTTP instead of reading the output file
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let toml = r#"
            [input]
            boundaries = "data/nta-source.geojson"

            [output]
            cleaned = "public/data/nyc-neighborhoods.geojson"

            [server]
            port = 3000
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.input.name_field, "NTAName");
        assert_eq!(config.input.borough_field, "BoroName");
        assert!(config.input.mapping_file.is_none());
        assert!(config.check.neighborhoods_csv.is_none());
        assert!(config.icons.shapes_url.is_none());
        assert!(config.icons.aliases.is_empty());
    }

    #[test]
    fn alias_table_parses() {
        let toml = r#"
            [input]
            boundaries = "in.geojson"

            [output]
            cleaned = "out.geojson"

            [icons.aliases]
            "prospect-lefferts-gardens" = "flatbush"

            [server]
            port = 8080
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.icons.aliases.get("prospect-lefferts-gardens").map(String::as_str),
            Some("flatbush")
        );
    }
}
