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

//! Plain coordinate-array geometry model, matching the GeoJSON nesting
//! (multipolygon -> polygon -> ring -> position). Rings are not validated
//! for closure or winding; the first ring of a polygon is the exterior by
//! convention only.

use geo_types::{LineString, MultiPolygon as GeoMultiPolygon, Polygon as GeoPolygon};

pub type Coord = [f64; 2];
pub type Ring = Vec<Coord>;
pub type Poly = Vec<Ring>;
pub type MultiPoly = Vec<Poly>;

/// Total number of positions across every ring of every polygon.
pub fn point_count(multi_poly: &MultiPoly) -> usize {
    multi_poly
        .iter()
        .map(|poly| poly.iter().map(Vec::len).sum::<usize>())
        .sum()
}

pub fn to_geo(multi_poly: &MultiPoly) -> GeoMultiPolygon<f64> {
    let polygons = multi_poly
        .iter()
        .map(|poly| {
            let mut rings = poly.iter().map(|ring| {
                LineString::from(
                    ring.iter()
                        .map(|coord| (coord[0], coord[1]))
                        .collect::<Vec<(f64, f64)>>(),
                )
            });
            let exterior = rings.next().unwrap_or_else(|| LineString(vec![]));
            GeoPolygon::new(exterior, rings.collect())
        })
        .collect();
    GeoMultiPolygon(polygons)
}

pub fn from_geo(multi_polygon: GeoMultiPolygon<f64>) -> MultiPoly {
    multi_polygon
        .0
        .into_iter()
        .map(|polygon| {
            let (exterior, interiors) = polygon.into_inner();
            std::iter::once(exterior)
                .chain(interiors)
                .map(|ring| {
                    ring.0
                        .into_iter()
                        .map(|coord| [coord.x, coord.y])
                        .collect()
                })
                .collect()
        })
        .collect()
}
