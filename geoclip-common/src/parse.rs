/*
 * Copyright 2021 Boyd Johnson
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Extracts a multipolygon from one decoded GeoJSON object.
//!
//! Accepted types are `Polygon`, `MultiPolygon`, `Feature` (wrapping one of
//! those), and `FeatureCollection` (whose member polygons are flattened into
//! one multipolygon). Recognized non-polygonal types are reported through the
//! warning sink and contribute an empty multipolygon; anything else is a
//! fatal structural error.

use crate::{
    error::GeoClipError,
    geometry::{Coord, MultiPoly, Poly, Ring},
};
use serde_json::Value;

// https://tools.ietf.org/html/rfc7946#section-3
const UNSUPPORTED_GEOJSON_TYPES: [&str; 5] = [
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "GeometryCollection",
];

/// GeoJSON object classification, decoded once from the `type` member and
/// then matched exhaustively.
#[derive(Debug, Clone, PartialEq)]
enum GeoJsonKind {
    Polygon,
    MultiPolygon,
    Feature,
    FeatureCollection,
    Unsupported(String),
    Unrecognized(String),
}

fn classify(value: &Value) -> Result<GeoJsonKind, GeoClipError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeoClipError::InvalidGeoJson("object has no 'type' member".to_string()))?;

    Ok(match kind {
        "Polygon" => GeoJsonKind::Polygon,
        "MultiPolygon" => GeoJsonKind::MultiPolygon,
        "Feature" => GeoJsonKind::Feature,
        "FeatureCollection" => GeoJsonKind::FeatureCollection,
        other if UNSUPPORTED_GEOJSON_TYPES.contains(&other) => {
            GeoJsonKind::Unsupported(other.to_string())
        }
        other => GeoJsonKind::Unrecognized(other.to_string()),
    })
}

/// Parse one decoded GeoJSON value into a multipolygon.
///
/// Validation is shallow: only the first position of the first ring is
/// type-checked up front. Deeper malformation surfaces as a structural error
/// during coordinate extraction.
pub fn parse(value: &Value, warn: &mut dyn FnMut(&str)) -> Result<MultiPoly, GeoClipError> {
    match classify(value)? {
        GeoJsonKind::Polygon => parse_polygon(value).map(|poly| vec![poly]),
        GeoJsonKind::MultiPolygon => parse_multi_polygon(value),
        GeoJsonKind::Feature => parse_feature(value, warn),
        GeoJsonKind::FeatureCollection => parse_feature_collection(value, warn),
        GeoJsonKind::Unsupported(kind) => {
            warn(&format!(
                "Not acceptable GeoJSON type '{}' encountered. Dropping",
                kind
            ));
            Ok(Vec::new())
        }
        GeoJsonKind::Unrecognized(kind) => Err(GeoClipError::InvalidGeoJson(format!(
            "unrecognized GeoJSON type '{}'",
            kind
        ))),
    }
}

fn parse_polygon(value: &Value) -> Result<Poly, GeoClipError> {
    let coordinates = value.get("coordinates").ok_or_else(|| {
        GeoClipError::InvalidGeoJson("Polygon coordinates not defined".to_string())
    })?;
    if !first_point_is_numeric(coordinates) {
        return Err(GeoClipError::InvalidGeoJson(
            "Polygon coordinates malformed".to_string(),
        ));
    }
    as_poly(coordinates)
}

fn parse_multi_polygon(value: &Value) -> Result<MultiPoly, GeoClipError> {
    let coordinates = value.get("coordinates").ok_or_else(|| {
        GeoClipError::InvalidGeoJson("MultiPolygon coordinates not defined".to_string())
    })?;
    let polys = coordinates.as_array().ok_or_else(|| {
        GeoClipError::InvalidGeoJson("MultiPolygon coordinates malformed".to_string())
    })?;

    // an empty coordinates array is a valid, empty geometry
    if polys.is_empty() {
        return Ok(Vec::new());
    }
    if !first_point_is_numeric(&coordinates[0]) {
        return Err(GeoClipError::InvalidGeoJson(
            "MultiPolygon coordinates malformed".to_string(),
        ));
    }
    polys.iter().map(as_poly).collect()
}

fn parse_feature(value: &Value, warn: &mut dyn FnMut(&str)) -> Result<MultiPoly, GeoClipError> {
    let geometry = value.get("geometry").ok_or_else(|| {
        GeoClipError::InvalidGeoJson("Feature has no 'geometry' member".to_string())
    })?;
    match classify(geometry)? {
        GeoJsonKind::Polygon => parse_polygon(geometry).map(|poly| vec![poly]),
        GeoJsonKind::MultiPolygon => parse_multi_polygon(geometry),
        GeoJsonKind::Unsupported(kind) => {
            warn(&format!(
                "Not acceptable GeoJSON type '{}' encountered. Dropping",
                kind
            ));
            Ok(Vec::new())
        }
        GeoJsonKind::Feature => Err(unrecognized_feature_geometry("Feature")),
        GeoJsonKind::FeatureCollection => Err(unrecognized_feature_geometry("FeatureCollection")),
        GeoJsonKind::Unrecognized(kind) => Err(unrecognized_feature_geometry(&kind)),
    }
}

fn unrecognized_feature_geometry(kind: &str) -> GeoClipError {
    GeoClipError::InvalidGeoJson(format!(
        "unrecognized Feature geometry GeoJSON type '{}'",
        kind
    ))
}

fn parse_feature_collection(
    value: &Value,
    warn: &mut dyn FnMut(&str),
) -> Result<MultiPoly, GeoClipError> {
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            GeoClipError::InvalidGeoJson("FeatureCollection has no 'features' member".to_string())
        })?;

    // polygons from different features are merged into a single multipolygon
    let mut multi_poly = Vec::new();
    for feature in features {
        multi_poly.extend(parse_feature(feature, warn)?);
    }
    Ok(multi_poly)
}

fn first_point_is_numeric(coordinates: &Value) -> bool {
    coordinates
        .get(0)
        .and_then(|ring| ring.get(0))
        .and_then(|point| point.get(0))
        .map(Value::is_number)
        .unwrap_or(false)
}

fn as_poly(value: &Value) -> Result<Poly, GeoClipError> {
    value
        .as_array()
        .ok_or_else(|| GeoClipError::InvalidGeoJson("polygon is not an array".to_string()))?
        .iter()
        .map(as_ring)
        .collect()
}

fn as_ring(value: &Value) -> Result<Ring, GeoClipError> {
    value
        .as_array()
        .ok_or_else(|| GeoClipError::InvalidGeoJson("polygon ring is not an array".to_string()))?
        .iter()
        .map(as_coord)
        .collect()
}

fn as_coord(value: &Value) -> Result<Coord, GeoClipError> {
    let position = value
        .as_array()
        .ok_or_else(|| GeoClipError::InvalidGeoJson("position is not an array".to_string()))?;
    let x = position.get(0).and_then(Value::as_f64);
    let y = position.get(1).and_then(Value::as_f64);
    match (x, y) {
        (Some(x), Some(y)) => Ok([x, y]),
        _ => Err(GeoClipError::InvalidGeoJson(
            "position is not a pair of numbers".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_collecting(value: &Value) -> (Result<MultiPoly, GeoClipError>, Vec<String>) {
        let mut warnings = Vec::new();
        let result = parse(value, &mut |msg: &str| warnings.push(msg.to_string()));
        (result, warnings)
    }

    fn square_coords() -> Value {
        json!([[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]])
    }

    fn square_poly() -> Poly {
        vec![vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]]
    }

    #[test]
    fn test_polygon_wraps_as_single_polygon_multipoly() {
        let value = json!({"type": "Polygon", "coordinates": square_coords()});
        let (result, warnings) = parse_collecting(&value);
        assert_eq!(result, Ok(vec![square_poly()]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_polygon_missing_coordinates_is_error() {
        let value = json!({"type": "Polygon"});
        let (result, _) = parse_collecting(&value);
        assert_eq!(
            result,
            Err(GeoClipError::InvalidGeoJson(
                "Polygon coordinates not defined".to_string()
            ))
        );
    }

    #[test]
    fn test_polygon_non_numeric_first_point_is_error() {
        let value = json!({"type": "Polygon", "coordinates": [[["a", "b"]]]});
        let (result, _) = parse_collecting(&value);
        assert_eq!(
            result,
            Err(GeoClipError::InvalidGeoJson(
                "Polygon coordinates malformed".to_string()
            ))
        );
    }

    #[test]
    fn test_empty_polygon_coordinates_is_error() {
        let value = json!({"type": "Polygon", "coordinates": []});
        let (result, _) = parse_collecting(&value);
        assert!(result.is_err());
    }

    #[test]
    fn test_multi_polygon() {
        let value = json!({"type": "MultiPolygon", "coordinates": [square_coords()]});
        let (result, warnings) = parse_collecting(&value);
        assert_eq!(result, Ok(vec![square_poly()]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_empty_multi_polygon_is_valid() {
        let value = json!({"type": "MultiPolygon", "coordinates": []});
        let (result, warnings) = parse_collecting(&value);
        assert_eq!(result, Ok(Vec::new()));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_multi_polygon_missing_coordinates_is_error() {
        let value = json!({"type": "MultiPolygon"});
        let (result, _) = parse_collecting(&value);
        assert_eq!(
            result,
            Err(GeoClipError::InvalidGeoJson(
                "MultiPolygon coordinates not defined".to_string()
            ))
        );
    }

    #[test]
    fn test_multi_polygon_malformed_coordinates_is_error() {
        let value = json!({"type": "MultiPolygon", "coordinates": [[["not a point"]]]});
        let (result, _) = parse_collecting(&value);
        assert!(result.is_err());
    }

    #[test]
    fn test_feature_with_polygon_geometry() {
        let value = json!({
            "type": "Feature",
            "properties": {"name": "test"},
            "geometry": {"type": "Polygon", "coordinates": square_coords()},
        });
        let (result, warnings) = parse_collecting(&value);
        assert_eq!(result, Ok(vec![square_poly()]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_feature_with_point_geometry_warns_and_yields_empty() {
        let value = json!({
            "type": "Feature",
            "properties": null,
            "geometry": {"type": "Point", "coordinates": [0.0, 0.0]},
        });
        let (result, warnings) = parse_collecting(&value);
        assert_eq!(result, Ok(Vec::new()));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Point"));
    }

    #[test]
    fn test_top_level_line_string_warns_and_yields_empty() {
        let value = json!({"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]});
        let (result, warnings) = parse_collecting(&value);
        assert_eq!(result, Ok(Vec::new()));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_feature_collection_flattens_and_warns_once() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": null,
                    "geometry": {"type": "Point", "coordinates": [0.0, 0.0]},
                },
                {
                    "type": "Feature",
                    "properties": null,
                    "geometry": {"type": "Polygon", "coordinates": square_coords()},
                },
            ],
        });
        let (result, warnings) = parse_collecting(&value);
        assert_eq!(result, Ok(vec![square_poly()]));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_empty_feature_collection() {
        let value = json!({"type": "FeatureCollection", "features": []});
        let (result, _) = parse_collecting(&value);
        assert_eq!(result, Ok(Vec::new()));
    }

    #[test]
    fn test_unrecognized_type_is_error() {
        let value = json!({"type": "Polygone", "coordinates": square_coords()});
        let (result, _) = parse_collecting(&value);
        assert_eq!(
            result,
            Err(GeoClipError::InvalidGeoJson(
                "unrecognized GeoJSON type 'Polygone'".to_string()
            ))
        );
    }

    #[test]
    fn test_missing_type_member_is_error() {
        let value = json!({"coordinates": square_coords()});
        let (result, _) = parse_collecting(&value);
        assert!(result.is_err());
    }

    #[test]
    fn test_feature_wrapping_feature_is_error() {
        let value = json!({
            "type": "Feature",
            "geometry": {"type": "Feature", "geometry": null},
        });
        let (result, _) = parse_collecting(&value);
        assert_eq!(
            result,
            Err(GeoClipError::InvalidGeoJson(
                "unrecognized Feature geometry GeoJSON type 'Feature'".to_string()
            ))
        );
    }
}
