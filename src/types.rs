use geojson::Geometry;
use serde::Serialize;

/// One named tract from the raw municipal boundary dataset.
#[derive(Debug, Clone)]
pub struct BoundaryRecord {
    pub tract_name: String,
    pub borough: String,
    pub geometry: Geometry,
}

/// Pipeline output unit: a tract reduced to the application's slug plus its
/// original name, borough and untouched geometry.
#[derive(Debug, Clone)]
pub struct CleanedFeature {
    pub slug: String,
    pub nta_name: String,
    pub borough: String,
    pub geometry: Geometry,
}

/// The unit square every icon path is normalized into.
pub const ICON_VIEW_BOX: ViewBox = ViewBox {
    min_x: 0.0,
    min_y: 0.0,
    width: 100.0,
    height: 100.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

/// A renderable neighborhood silhouette: SVG path data plus the viewport it
/// was normalized against.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeIcon {
    pub path: String,
    pub view_box: ViewBox,
}
