use crate::config::AppConfig;
use crate::data;
use crate::mapping::SlugMapping;
use crate::types::{BoundaryRecord, CleanedFeature};
use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy)]
pub struct PipelineSummary {
    pub input: usize,
    pub written: usize,
    pub dropped: usize,
}

/// Join raw tract records against the slug mapping. Order-preserving, no
/// deduplication; a tract with no mapping entry is logged and excluded.
pub fn reconcile(records: Vec<BoundaryRecord>, mapping: &SlugMapping) -> Vec<CleanedFeature> {
    let mut cleaned = Vec::with_capacity(records.len());

    for record in records {
        let slug = match mapping.get(&record.tract_name) {
            Some(slug) => slug.to_string(),
            None => {
                tracing::warn!("No mapping for: {} ({})", record.tract_name, record.borough);
                continue;
            }
        };

        cleaned.push(CleanedFeature {
            slug,
            nta_name: record.tract_name,
            borough: record.borough,
            geometry: record.geometry,
        });
    }

    cleaned
}

pub fn to_feature_collection(features: &[CleanedFeature]) -> FeatureCollection {
    let features = features
        .iter()
        .map(|f| {
            let mut properties = geojson::JsonObject::new();
            properties.insert("ntaname".to_string(), f.nta_name.clone().into());
            properties.insert("slug".to_string(), f.slug.clone().into());
            properties.insert("borough".to_string(), f.borough.clone().into());

            Feature {
                bbox: None,
                geometry: Some(f.geometry.clone()),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Serialize the cleaned collection and move it into place in one rename, so
/// a failed run never leaves a torn document behind.
pub fn write_cleaned(path: &Path, features: &[CleanedFeature]) -> Result<()> {
    let collection = to_feature_collection(features);
    let document = serde_json::to_string_pretty(&collection)
        .context("Failed to serialize cleaned FeatureCollection")?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
    tmp.write_all(document.as_bytes())
        .context("Failed to write cleaned dataset")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to move cleaned dataset into place: {:?}", path))?;

    Ok(())
}

pub fn run(config: &AppConfig, mapping: &SlugMapping) -> Result<PipelineSummary> {
    let records = data::load_boundaries(config)?;
    let input = records.len();

    let cleaned = reconcile(records, mapping);
    let written = cleaned.len();

    write_cleaned(&config.output.cleaned, &cleaned)?;
    println!("Processed {} neighborhoods", written);
    println!("Output saved to: {:?}", config.output.cleaned);

    Ok(PipelineSummary {
        input,
        written,
        dropped: input - written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Geometry, Value};

    fn square(lng: f64, lat: f64) -> Geometry {
        Geometry::new(Value::Polygon(vec![vec![
            vec![lng, lat],
            vec![lng + 0.01, lat],
            vec![lng + 0.01, lat + 0.01],
            vec![lng, lat + 0.01],
            vec![lng, lat],
        ]]))
    }

    fn record(name: &str, borough: &str) -> BoundaryRecord {
        BoundaryRecord {
            tract_name: name.to_string(),
            borough: borough.to_string(),
            geometry: square(-73.95, 40.71),
        }
    }

    #[test]
    fn mapped_tract_becomes_one_cleaned_feature() {
        let mapping = SlugMapping::from_entries([("Williamsburg", "williamsburg")]);
        let input = vec![record("Williamsburg", "Brooklyn")];
        let expected_geometry = input[0].geometry.clone();

        let cleaned = reconcile(input, &mapping);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].slug, "williamsburg");
        assert_eq!(cleaned[0].nta_name, "Williamsburg");
        assert_eq!(cleaned[0].borough, "Brooklyn");
        assert_eq!(cleaned[0].geometry, expected_geometry);
    }

    #[test]
    fn unmapped_tract_is_dropped() {
        let mapping = SlugMapping::from_entries([("Williamsburg", "williamsburg")]);
        let input = vec![
            record("Williamsburg", "Brooklyn"),
            record("Random Unmapped Tract", "Brooklyn"),
        ];

        let cleaned = reconcile(input, &mapping);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].slug, "williamsburg");
    }

    #[test]
    fn output_preserves_input_order_and_duplicate_slugs() {
        let mapping = SlugMapping::from_entries([
            ("Bushwick North", "bushwick"),
            ("Bushwick South", "bushwick"),
            ("Greenpoint", "greenpoint"),
        ]);
        let input = vec![
            record("Bushwick South", "Brooklyn"),
            record("Greenpoint", "Brooklyn"),
            record("Bushwick North", "Brooklyn"),
        ];

        let cleaned = reconcile(input, &mapping);

        let slugs: Vec<&str> = cleaned.iter().map(|f| f.slug.as_str()).collect();
        assert_eq!(slugs, vec!["bushwick", "greenpoint", "bushwick"]);
    }

    #[test]
    fn serialized_output_is_deterministic() {
        let mapping = SlugMapping::from_entries([
            ("Williamsburg", "williamsburg"),
            ("Greenpoint", "greenpoint"),
        ]);
        let input = vec![
            record("Williamsburg", "Brooklyn"),
            record("Greenpoint", "Brooklyn"),
        ];

        let first = serde_json::to_string_pretty(&to_feature_collection(&reconcile(
            input.clone(),
            &mapping,
        )))
        .unwrap();
        let second = serde_json::to_string_pretty(&to_feature_collection(&reconcile(
            input, &mapping,
        )))
        .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn cleaned_properties_are_exactly_three_fields() {
        let mapping = SlugMapping::from_entries([("Williamsburg", "williamsburg")]);
        let cleaned = reconcile(vec![record("Williamsburg", "Brooklyn")], &mapping);

        let collection = to_feature_collection(&cleaned);
        let properties = collection.features[0].properties.as_ref().unwrap();

        let mut keys: Vec<&str> = properties.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["borough", "ntaname", "slug"]);
    }

    #[test]
    fn write_cleaned_round_trips_through_parse() {
        let mapping = SlugMapping::from_entries([("Williamsburg", "williamsburg")]);
        let cleaned = reconcile(vec![record("Williamsburg", "Brooklyn")], &mapping);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nyc-neighborhoods.geojson");
        write_cleaned(&path, &cleaned).unwrap();

        let document = std::fs::read_to_string(&path).unwrap();
        let reread = crate::data::parse_cleaned(document.parse().unwrap()).unwrap();

        assert_eq!(reread.len(), 1);
        assert_eq!(reread[0].slug, "williamsburg");
        assert_eq!(reread[0].nta_name, "Williamsburg");
        assert_eq!(reread[0].borough, "Brooklyn");
        assert_eq!(reread[0].geometry, cleaned[0].geometry);
    }
}
