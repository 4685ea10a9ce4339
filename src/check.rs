use crate::config::AppConfig;
use crate::data;
use crate::mapping::{IconAliases, SlugMapping};
use crate::types::CleanedFeature;
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::path::Path;

/// Result of verifying that every known neighborhood slug reaches at least
/// one cleaned feature. A miss means a permanently shape-less neighborhood
/// in the UI, usually a tract name missing from (or misspelled in) the
/// mapping table.
#[derive(Debug)]
pub struct CoverageReport {
    pub known: usize,
    pub missing: Vec<String>,
}

impl CoverageReport {
    pub fn covered(&self) -> usize {
        self.known - self.missing.len()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check every known slug against the cleaned feature set, following the
/// icon alias layer the renderer will use. Misses are logged and collected,
/// never fatal.
pub fn coverage(
    features: &[CleanedFeature],
    known_slugs: &BTreeSet<String>,
    aliases: &IconAliases,
) -> CoverageReport {
    let present: HashSet<&str> = features.iter().map(|f| f.slug.as_str()).collect();

    let mut missing = Vec::new();
    for slug in known_slugs {
        let resolved = aliases.resolve(slug);
        if !present.contains(resolved) {
            tracing::warn!("No boundary feature for neighborhood: {}", slug);
            missing.push(slug.clone());
        }
    }

    CoverageReport {
        known: known_slugs.len(),
        missing,
    }
}

/// Every slug the application knows about: the mapping table's codomain,
/// plus the neighborhood roster CSV when one is configured.
pub fn known_slugs(mapping: &SlugMapping, roster: Option<&Path>) -> Result<BTreeSet<String>> {
    let mut slugs: BTreeSet<String> = mapping.slugs().into_iter().map(String::from).collect();

    if let Some(path) = roster {
        slugs.extend(load_roster_slugs(path)?);
    }

    Ok(slugs)
}

fn load_roster_slugs(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open neighborhood roster: {:?}", path))?;
    let mut rdr = ReaderBuilder::new().from_reader(file);
    let headers = rdr.headers()?.clone();

    let slug_idx = headers.iter().position(|h| h == "slug")
        .ok_or_else(|| anyhow!("Column 'slug' not found in roster: {:?}", path))?;

    let mut slugs = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let slug = record.get(slug_idx).unwrap_or("").to_string();
        if slug.is_empty() {
            continue;
        }
        slugs.push(slug);
    }

    Ok(slugs)
}

/// Load the cleaned document named by the config and run the coverage check
/// against it.
pub fn run(config: &AppConfig, mapping: &SlugMapping) -> Result<CoverageReport> {
    let content = std::fs::read_to_string(&config.output.cleaned)
        .with_context(|| format!("Failed to read cleaned dataset: {:?}", config.output.cleaned))?;
    let features = data::parse_cleaned(content.parse().context("Failed to parse cleaned dataset")?)?;

    let known = known_slugs(mapping, config.check.neighborhoods_csv.as_deref())?;
    let aliases = IconAliases::new(config.icons.aliases.clone());

    let report = coverage(&features, &known, &aliases);
    println!(
        "Coverage: {}/{} neighborhoods have boundary data",
        report.covered(),
        report.known
    );
    if !report.is_complete() {
        println!("Missing shapes: {}", report.missing.join(", "));
    }

    Ok(report)
}
