use crate::data;
use crate::icon;
use crate::mapping::IconAliases;
use crate::types::{CleanedFeature, ShapeIcon};
use anyhow::{Context, Result};
use geojson::GeoJson;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Where the cleaned dataset lives: the pipeline's output file locally, or
/// the same document served as a static asset.
#[derive(Debug, Clone)]
pub enum ShapeSource {
    File(PathBuf),
    Url(String),
}

/// Get-or-fetch-once holder for the cleaned feature collection.
///
/// The dataset is static per deployment, so the first successful load is
/// kept for the process lifetime. A failed load is logged and pinned: every
/// later caller gets "no shapes" for the rest of the session. Icons are
/// decorative, so nothing here ever surfaces an error.
pub struct ShapeCache {
    source: Option<ShapeSource>,
    features: OnceCell<Option<Arc<Vec<CleanedFeature>>>>,
}

impl ShapeCache {
    pub fn new(source: ShapeSource) -> Self {
        Self {
            source: Some(source),
            features: OnceCell::new(),
        }
    }

    /// A cache whose collection is already resident. Lets tests and callers
    /// that load the dataset themselves skip the fetch entirely.
    pub fn preloaded(features: Vec<CleanedFeature>) -> Self {
        Self {
            source: None,
            features: OnceCell::new_with(Some(Some(Arc::new(features)))),
        }
    }

    /// The cleaned feature collection, loaded at most once. Concurrent first
    /// callers await the same in-flight load.
    pub async fn features(&self) -> Option<Arc<Vec<CleanedFeature>>> {
        self.features
            .get_or_init(|| async {
                match self.load().await {
                    Ok(features) => {
                        tracing::info!("Loaded {} neighborhood shapes", features.len());
                        Some(Arc::new(features))
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load neighborhood shapes: {:#}", e);
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Render one neighborhood silhouette from the cached collection.
    pub async fn icon(&self, slug: &str, aliases: &IconAliases) -> Option<ShapeIcon> {
        let features = self.features().await?;
        icon::shape_icon(&features, slug, aliases)
    }

    async fn load(&self) -> Result<Vec<CleanedFeature>> {
        let source = self.source.as_ref().context("Shape cache has no source")?;

        let geojson: GeoJson = match source {
            ShapeSource::File(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read cleaned dataset: {:?}", path))?;
                content
                    .parse()
                    .with_context(|| format!("Failed to parse cleaned dataset: {:?}", path))?
            }
            ShapeSource::Url(url) => {
                let body = reqwest::get(url)
                    .await
                    .with_context(|| format!("Failed to fetch cleaned dataset: {}", url))?
                    .error_for_status()
                    .with_context(|| format!("Shape fetch rejected: {}", url))?
                    .text()
                    .await
                    .with_context(|| format!("Failed to read shape response body: {}", url))?;
                body.parse()
                    .with_context(|| format!("Failed to parse cleaned dataset from {}", url))?
            }
        };

        data::parse_cleaned(geojson)
    }
}
