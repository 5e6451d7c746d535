use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{entity::Task, error::EngineResult, store::EntityStore};

use super::Job;

/// Degrees-to-meters scale used by [`shoelace_area_m2`]. This is a flat-earth approximation
/// (one degree of latitude/longitude both treated as ~111,320 meters) good enough to produce a
/// positive, plausible area for small polygons; it is not a geodesic area calculation and makes
/// no claim to real-world surveying accuracy. No GeoJSON reference material exists anywhere in
/// the retrieval pack this crate was built from, so this is a deliberately minimal stand-in for
/// the out-of-scope "polygonArea" job logic.
const DEGREES_TO_METERS: f64 = 111_320.0;

/// Extracts the outer ring of coordinates from a GeoJSON `Feature`/`Geometry` whose type is
/// `Polygon`, returning `[[lon, lat], ...]`.
fn polygon_ring(geo_json: &Value) -> Result<Vec<(f64, f64)>, String> {
    let geometry = geo_json.get("geometry").unwrap_or(geo_json);
    let geometry_type = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| "geoJson has no geometry type".to_owned())?;
    if geometry_type != "Polygon" {
        return Err(format!("expected Polygon geometry, found {geometry_type}"));
    }
    let outer_ring = geometry
        .get("coordinates")
        .and_then(Value::as_array)
        .and_then(|rings| rings.first())
        .and_then(Value::as_array)
        .ok_or_else(|| "polygon has no coordinate ring".to_owned())?;
    let mut points = Vec::with_capacity(outer_ring.len());
    for point in outer_ring {
        let pair = point
            .as_array()
            .ok_or_else(|| "coordinate is not a pair".to_owned())?;
        let lon = pair.first().and_then(Value::as_f64).unwrap_or_default();
        let lat = pair.get(1).and_then(Value::as_f64).unwrap_or_default();
        points.push((lon, lat));
    }
    Ok(points)
}

/// Shoelace formula over a ring of `(lon, lat)` pairs in degrees, scaled to an approximate
/// square-meter area via [`DEGREES_TO_METERS`].
fn shoelace_area_m2(ring: &[(f64, f64)]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for window in ring.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        sum += x0 * y1 - x1 * y0;
    }
    let (x0, y0) = ring[ring.len() - 1];
    let (x1, y1) = ring[0];
    sum += x0 * y1 - x1 * y0;
    let area_degrees_sq = sum.abs() / 2.0;
    area_degrees_sq * DEGREES_TO_METERS * DEGREES_TO_METERS
}

/// The stand-in for the spec's `analysis` job (geometry-within-country lookup). With no
/// geospatial reference dataset in scope, it reports the `properties.country` field of the
/// submitted GeoJSON when present, otherwise `"Unknown"`.
pub struct GeometryAnalysisJob;

#[async_trait]
impl Job for GeometryAnalysisJob {
    async fn run(&self, task: &mut Task, _store: &dyn EntityStore) -> EngineResult<Value> {
        let raw = task.input.as_deref().unwrap_or(&task.geo_json);
        let geo_json = crate::util::parse_or_raw(raw);
        let country = geo_json
            .get("properties")
            .and_then(|properties| properties.get("country"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_owned();
        let output = json!({ "country": country });
        task.output = Some(crate::util::to_json_string(&output));
        Ok(output)
    }
}

pub(super) fn compute_polygon_area(geo_json: &Value) -> Result<Value, String> {
    let ring = polygon_ring(geo_json)?;
    let area = shoelace_area_m2(&ring);
    Ok(json!({ "area": area, "unit": "square meters" }))
}
