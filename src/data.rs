use crate::config::AppConfig;
use crate::types::{BoundaryRecord, CleanedFeature};
use anyhow::{Context, Result, anyhow};
use geo::MultiPolygon;
use geojson::{Feature, GeoJson, Value};
use shapefile::Reader;
use std::fs::File;
use std::io::BufReader;

/// Load the raw tract boundaries named by the config, dispatching on the
/// file extension. Unreadable or structurally invalid input is fatal.
pub fn load_boundaries(config: &AppConfig) -> Result<Vec<BoundaryRecord>> {
    let extension = config.input.boundaries.extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Input boundary file has no extension"))?;

    let records = match extension.as_str() {
        "shp" => load_shapefile(config)?,
        "json" | "geojson" => load_geojson(config)?,
        _ => return Err(anyhow!("Unsupported boundary format: {}", extension)),
    };

    println!("Loaded {} boundary records", records.len());

    Ok(records)
}

fn load_geojson(config: &AppConfig) -> Result<Vec<BoundaryRecord>> {
    let file = File::open(&config.input.boundaries)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", config.input.boundaries))?;
    let reader = BufReader::new(file);

    // Parses the whole document up front; the NTA dataset is a few MB.
    let geojson = GeoJson::from_reader(reader).context("Failed to parse boundary GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("Boundary GeoJSON must be a FeatureCollection")),
    };

    let mut records = Vec::new();

    for feature in collection.features {
        // Tracts without a name cannot be reconciled; skip them outright.
        let tract_name = match string_property(&feature, &config.input.name_field) {
            Some(name) => name,
            None => continue,
        };
        let borough = string_property(&feature, &config.input.borough_field).unwrap_or_default();

        let geometry = match feature.geometry {
            Some(geometry) => match geometry.value {
                Value::Polygon(_) | Value::MultiPolygon(_) => geometry,
                _ => continue, // Skip points/lines
            },
            None => continue,
        };

        records.push(BoundaryRecord {
            tract_name,
            borough,
            geometry,
        });
    }

    Ok(records)
}

fn load_shapefile(config: &AppConfig) -> Result<Vec<BoundaryRecord>> {
    let mut reader = Reader::from_path(&config.input.boundaries)
        .with_context(|| format!("Failed to open Shapefile: {:?}", config.input.boundaries))?;

    let mut records = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let tract_name = match dbase_string(&record, &config.input.name_field) {
            Some(name) => name,
            None => continue,
        };
        let borough = dbase_string(&record, &config.input.borough_field).unwrap_or_default();

        let geometry = match shape {
            shapefile::Shape::Polygon(polygon) => {
                let multi: MultiPolygon<f64> = polygon.try_into()
                    .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?;
                geojson::Geometry::new(Value::from(&multi))
            }
            shapefile::Shape::PolygonM(polygon) => {
                let multi: MultiPolygon<f64> = polygon.try_into()
                    .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?;
                geojson::Geometry::new(Value::from(&multi))
            }
            shapefile::Shape::PolygonZ(polygon) => {
                let multi: MultiPolygon<f64> = polygon.try_into()
                    .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?;
                geojson::Geometry::new(Value::from(&multi))
            }
            _ => continue, // Skip non-polygon shapes
        };

        records.push(BoundaryRecord {
            tract_name,
            borough,
            geometry,
        });
    }

    Ok(records)
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    let value = feature.properties.as_ref()?.get(key)?;
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn dbase_string(record: &shapefile::dbase::Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(shapefile::dbase::FieldValue::Character(Some(s))) => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Parse the pipeline's output document back into cleaned features, for the
/// runtime shape store.
pub fn parse_cleaned(geojson: GeoJson) -> Result<Vec<CleanedFeature>> {
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("Cleaned dataset must be a FeatureCollection")),
    };

    let mut features = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        let slug = string_property(&feature, "slug")
            .ok_or_else(|| anyhow!("Cleaned feature missing slug property"))?;
        let nta_name = string_property(&feature, "ntaname").unwrap_or_else(|| slug.clone());
        let borough = string_property(&feature, "borough").unwrap_or_default();
        let geometry = feature.geometry
            .ok_or_else(|| anyhow!("Cleaned feature {} has no geometry", slug))?;

        features.push(CleanedFeature {
            slug,
            nta_name,
            borough,
            geometry,
        });
    }

    Ok(features)
}
