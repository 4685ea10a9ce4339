use crate::mapping::IconAliases;
use crate::types::{CleanedFeature, ShapeIcon, ICON_VIEW_BOX};
use geo::bounding_rect::BoundingRect;
use geo::{Coord, LineString};
use geojson::Value;
use std::fmt::Write;

/// Rings longer than this are decimated before path emission. Icons are
/// low-fidelity silhouettes; a handful of points reads fine at icon size.
const MAX_ICON_POINTS: usize = 15;

/// Produce the SVG path silhouette for a neighborhood slug, or `None` when
/// no boundary is available (unknown slug, non-areal geometry, degenerate
/// extent). Lookup is first-match over the cleaned feature set, after the
/// alias layer has had its say.
pub fn shape_icon(
    features: &[CleanedFeature],
    slug: &str,
    aliases: &IconAliases,
) -> Option<ShapeIcon> {
    let resolved = aliases.resolve(slug);
    let feature = features.iter().find(|f| f.slug == resolved)?;

    let ring = outer_ring(&feature.geometry.value)?;
    let points = ring_points(ring)?;
    let simplified = simplify_ring(&points);
    let path = ring_to_path(&simplified)?;

    Some(ShapeIcon {
        path,
        view_box: ICON_VIEW_BOX,
    })
}

/// Standalone SVG document for one icon, used by the `icon` subcommand.
pub fn svg_document(icon: &ShapeIcon) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" preserveAspectRatio="xMidYMid meet">"#,
        icon.view_box.min_x, icon.view_box.min_y, icon.view_box.width, icon.view_box.height,
    );
    let _ = writeln!(
        out,
        r##"  <path d="{}" fill="#64748b" fill-opacity="0.6" stroke="#64748b" stroke-width="1.5" vector-effect="non-scaling-stroke"/>"##,
        icon.path,
    );
    out.push_str("</svg>\n");
    out
}

/// Silhouette ring only: a polygon's first ring, or the first polygon's
/// first ring for a multi-polygon. Holes are ignored.
fn outer_ring(value: &Value) -> Option<&Vec<Vec<f64>>> {
    match value {
        Value::Polygon(rings) => rings.first(),
        Value::MultiPolygon(polygons) => polygons.first().and_then(|rings| rings.first()),
        _ => None,
    }
}

fn ring_points(ring: &[Vec<f64>]) -> Option<Vec<(f64, f64)>> {
    ring.iter()
        .map(|position| Some((*position.first()?, *position.get(1)?)))
        .collect()
}

/// Stride decimation: every k-th point with `k = ceil(n / 15)`, keeping the
/// original final point so the ring stays visually closed. Not
/// shape-preserving, and not meant to be.
fn simplify_ring(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if points.len() <= MAX_ICON_POINTS {
        return points.to_vec();
    }

    let step = points.len().div_ceil(MAX_ICON_POINTS);
    let mut simplified: Vec<(f64, f64)> = points.iter().copied().step_by(step).collect();

    let last = points[points.len() - 1];
    if simplified.last() != Some(&last) {
        simplified.push(last);
    }

    simplified
}

/// Normalize into the 0-100 unit square (latitude flipped so north is up on
/// screen) and emit `M`/`L` commands with a closing `Z`. A ring whose
/// bounding box has no width or height cannot be normalized; that yields
/// `None` rather than a non-finite path.
fn ring_to_path(points: &[(f64, f64)]) -> Option<String> {
    let line: LineString<f64> = points
        .iter()
        .map(|&(x, y)| Coord { x, y })
        .collect();
    let bbox = line.bounding_rect()?;

    let width = bbox.width();
    let height = bbox.height();
    if !width.is_finite() || !height.is_finite() || width == 0.0 || height == 0.0 {
        return None;
    }

    let mut path = String::new();
    for (i, &(lng, lat)) in points.iter().enumerate() {
        let x = (lng - bbox.min().x) / width * 100.0;
        let y = 100.0 - (lat - bbox.min().y) / height * 100.0;
        let command = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            path.push(' ');
        }
        let _ = write!(path, "{}{:.2},{:.2}", command, x, y);
    }
    path.push_str(" Z");

    Some(path)
}
