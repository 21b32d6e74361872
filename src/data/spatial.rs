use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use super::model::{Record, RecordTable};

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("GeoJSON contains no Polygon or MultiPolygon geometry")]
    NoPolygons,
    #[error("position with fewer than two coordinates")]
    BadPosition,
    #[error("ring with {0} positions; at least 4 are required")]
    RingTooShort(usize),
}

// ---------------------------------------------------------------------------
// GeoJSON subset: only what is needed to extract polygons
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeoJson {
    FeatureCollection {
        features: Vec<GeoJson>,
    },
    Feature {
        geometry: Option<Box<GeoJson>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJson>,
    },
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Other,
}

type Ring = Vec<[f64; 2]>;

/// One polygon: an exterior ring and zero or more holes, as `[lon, lat]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

/// A spatial mask made of one or more polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    polygons: Vec<Polygon>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Inside,
    OnEdge,
    Outside,
}

impl Boundary {
    pub fn new(polygons: Vec<Polygon>) -> Result<Self, BoundaryError> {
        if polygons.is_empty() {
            return Err(BoundaryError::NoPolygons);
        }
        Ok(Boundary { polygons })
    }

    /// Parse a GeoJSON document (FeatureCollection, Feature, geometry or
    /// GeometryCollection). Non-polygon geometries are skipped.
    pub fn from_geojson(text: &str) -> Result<Self, BoundaryError> {
        let doc: GeoJson = serde_json::from_str(text)?;
        let mut polygons = Vec::new();
        collect_polygons(&doc, &mut polygons)?;
        Boundary::new(polygons)
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Whether `(lon, lat)` lies strictly inside the boundary. Points on an
    /// edge, including hole edges, are outside.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let p = [lon, lat];
        self.polygons.iter().any(|poly| {
            locate(&poly.exterior, p) == Location::Inside
                && poly.holes.iter().all(|h| locate(h, p) == Location::Outside)
        })
    }
}

fn collect_polygons(doc: &GeoJson, out: &mut Vec<Polygon>) -> Result<(), BoundaryError> {
    match doc {
        GeoJson::FeatureCollection { features } => {
            for f in features {
                collect_polygons(f, out)?;
            }
        }
        GeoJson::Feature { geometry } => {
            if let Some(g) = geometry {
                collect_polygons(g, out)?;
            }
        }
        GeoJson::GeometryCollection { geometries } => {
            for g in geometries {
                collect_polygons(g, out)?;
            }
        }
        GeoJson::Polygon { coordinates } => out.push(polygon(coordinates)?),
        GeoJson::MultiPolygon { coordinates } => {
            for rings in coordinates {
                out.push(polygon(rings)?);
            }
        }
        GeoJson::Other => {}
    }
    Ok(())
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon, BoundaryError> {
    let mut rings = rings.iter().map(|r| ring(r));
    let exterior = match rings.next() {
        Some(r) => r?,
        None => return Err(BoundaryError::RingTooShort(0)),
    };
    let holes = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon { exterior, holes })
}

fn ring(positions: &[Vec<f64>]) -> Result<Ring, BoundaryError> {
    if positions.len() < 4 {
        return Err(BoundaryError::RingTooShort(positions.len()));
    }
    positions
        .iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok([*x, *y]),
            _ => Err(BoundaryError::BadPosition),
        })
        .collect()
}

/// Even-odd ray casting with an explicit on-edge check.
fn locate(ring: &[[f64; 2]], p: [f64; 2]) -> Location {
    let [px, py] = p;
    let mut inside = false;
    let n = ring.len();
    for i in 0..n {
        let [ax, ay] = ring[i];
        let [bx, by] = ring[(i + 1) % n];

        let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
        if cross == 0.0
            && px >= ax.min(bx)
            && px <= ax.max(bx)
            && py >= ay.min(by)
            && py <= ay.max(by)
        {
            return Location::OnEdge;
        }

        if (ay > py) != (by > py) {
            let x_at = ax + (py - ay) * (bx - ax) / (by - ay);
            if px < x_at {
                inside = !inside;
            }
        }
    }
    if inside {
        Location::Inside
    } else {
        Location::Outside
    }
}

// ---------------------------------------------------------------------------
// Spatial subset
// ---------------------------------------------------------------------------

/// Keep the rows whose `(lon, lat)` lies inside `boundary`.
/// Rows without numeric coordinates are dropped.
pub fn within(table: &RecordTable, boundary: &Boundary) -> RecordTable {
    let rows: Vec<Arc<Record>> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            table
                .point(*i)
                .is_some_and(|[lon, lat]| boundary.contains(lon, lat))
        })
        .map(|(_, r)| Arc::clone(r))
        .collect();
    log::info!(
        "spatial mask over {} polygon(s): {} -> {} rows",
        boundary.polygons.len(),
        table.len(),
        rows.len()
    );
    table.with_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::table;
    use crate::data::model::Value;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "zona"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
                    [[4, 4], [6, 4], [6, 6], [4, 6], [4, 4]]
                ]
            }
        }, {
            "type": "Feature",
            "properties": {},
            "geometry": {"type": "Point", "coordinates": [50, 50]}
        }]
    }"#;

    #[test]
    fn parses_feature_collection_with_holes() {
        let b = Boundary::from_geojson(SQUARE).expect("parse");
        assert_eq!(b.polygons().len(), 1);
        assert_eq!(b.polygons()[0].holes.len(), 1);
    }

    #[test]
    fn contains_respects_holes_and_edges() {
        let b = Boundary::from_geojson(SQUARE).expect("parse");
        assert!(b.contains(2.0, 2.0));
        assert!(!b.contains(5.0, 5.0));
        assert!(!b.contains(11.0, 5.0));
        assert!(!b.contains(0.0, 5.0));
        assert!(!b.contains(10.0, 10.0));
        assert!(!b.contains(4.0, 5.0));
    }

    #[test]
    fn multipolygon_matches_any_part() {
        let b = Boundary::from_geojson(
            r#"{"type": "MultiPolygon", "coordinates": [
                [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]],
                [[[5, 5], [6, 5], [6, 6], [5, 6], [5, 5]]]
            ]}"#,
        )
        .expect("parse");
        assert!(b.contains(0.5, 0.5));
        assert!(b.contains(5.5, 5.5));
        assert!(!b.contains(3.0, 3.0));
    }

    #[test]
    fn rejects_documents_without_polygons() {
        assert!(matches!(
            Boundary::from_geojson(r#"{"type": "Point", "coordinates": [1, 2]}"#),
            Err(BoundaryError::NoPolygons)
        ));
        assert!(matches!(
            Boundary::from_geojson("not json"),
            Err(BoundaryError::Json(_))
        ));
        assert!(matches!(
            Boundary::from_geojson(r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 1]]]}"#),
            Err(BoundaryError::RingTooShort(2))
        ));
    }

    #[test]
    fn within_keeps_points_inside() {
        let b = Boundary::from_geojson(SQUARE).expect("parse");
        let t = table(&[
            &[("lat", Value::from(2.0)), ("lon", Value::from(2.0)), ("id", Value::from(1))],
            &[("lat", Value::from(5.0)), ("lon", Value::from(5.0)), ("id", Value::from(2))],
            &[("lat", Value::from(20.0)), ("lon", Value::from(2)), ("id", Value::from(3))],
            &[("lat", Value::from(8)), ("lon", Value::from(9.5)), ("id", Value::from(4))],
        ]);
        let out = within(&t, &b);
        let ids: Vec<_> = out.column("id").expect("id").cloned().collect();
        assert_eq!(ids, vec![Value::from(1), Value::from(4)]);
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn no_rows_inside_is_an_empty_table() {
        let b = Boundary::from_geojson(SQUARE).expect("parse");
        let t = table(&[&[("lat", Value::from(-1.0)), ("lon", Value::from(-1.0))]]);
        let out = within(&t, &b);
        assert!(out.is_empty());
        assert_eq!(out.column_names(), t.column_names());
    }
}
