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

//! Feeds the gathered multipolygons through the boolean operation and wraps
//! the result as a GeoJSON Feature. The clipping algorithm itself comes from
//! `geo-booleanop`; operands fold left to right, so for `difference` the
//! first operand is the base every later geometry is removed from.

use geo_booleanop::boolean::BooleanOp;
use geo_types::MultiPolygon as GeoMultiPolygon;
use geoclip_common::{
    error::GeoClipError,
    geometry::{self, MultiPoly},
};
use geojson::{feature::Id, Feature, Geometry, Value};
use std::{
    fs,
    io::{stdout, Write},
    path::Path,
    str::FromStr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Union,
    Intersection,
    Difference,
    Xor,
}

impl FromStr for Operation {
    type Err = GeoClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(Operation::Union),
            "intersection" => Ok(Operation::Intersection),
            "difference" => Ok(Operation::Difference),
            "xor" => Ok(Operation::Xor),
            other => Err(GeoClipError::Error(format!(
                "Unknown operation '{}'",
                other
            ))),
        }
    }
}

fn boolean(
    operation: Operation,
    left: &GeoMultiPolygon<f64>,
    right: &GeoMultiPolygon<f64>,
) -> GeoMultiPolygon<f64> {
    match operation {
        Operation::Union => left.union(right),
        Operation::Intersection => left.intersection(right),
        Operation::Difference => left.difference(right),
        Operation::Xor => left.xor(right),
    }
}

/// Apply the operation across the ordered operand list, folding left to
/// right. Zero operands yield an empty multipolygon; a single operand is
/// returned untouched.
pub fn apply(operation: Operation, multi_polys: &[MultiPoly]) -> MultiPoly {
    let mut iter = multi_polys.iter();
    let first = match iter.next() {
        Some(multi_poly) => multi_poly,
        None => return Vec::new(),
    };
    if multi_polys.len() == 1 {
        return first.clone();
    }

    let mut result = geometry::to_geo(first);
    for multi_poly in iter {
        result = boolean(operation, &result, &geometry::to_geo(multi_poly));
    }
    geometry::from_geo(result)
}

/// Like `apply`, but folds the operand list in successive batches of
/// roughly `points_goal` points. The fold order is unchanged, so the result
/// is the same; this only bounds how many operands are in flight per pass.
pub fn apply_batched(
    operation: Operation,
    multi_polys: Vec<MultiPoly>,
    points_goal: usize,
) -> MultiPoly {
    let mut iter = multi_polys.into_iter();
    let mut result = match iter.next() {
        Some(multi_poly) => multi_poly,
        None => return Vec::new(),
    };

    let mut batch: Vec<MultiPoly> = Vec::new();
    let mut points = geometry::point_count(&result);
    for multi_poly in iter {
        points += geometry::point_count(&multi_poly);
        batch.push(multi_poly);
        if points >= points_goal {
            batch.insert(0, result);
            result = apply(operation, &batch);
            batch.clear();
            points = geometry::point_count(&result);
        }
    }
    if !batch.is_empty() {
        batch.insert(0, result);
        result = apply(operation, &batch);
    }
    result
}

/// Wrap the result as `{type: "Feature", properties: null, geometry:
/// {type: "MultiPolygon", coordinates: ...}}`, with an optional `id`.
pub fn to_feature(multi_poly: MultiPoly, id: Option<Id>) -> Feature {
    let coordinates = multi_poly
        .into_iter()
        .map(|poly| {
            poly.into_iter()
                .map(|ring| ring.into_iter().map(|coord| coord.to_vec()).collect())
                .collect()
        })
        .collect();
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::MultiPolygon(coordinates))),
        id,
        properties: None,
        foreign_members: None,
    }
}

/// Write the result document once, to the output file (creating parent
/// directories as needed) or to stdout.
pub fn write_feature(feature: &Feature, output: Option<&Path>) -> Result<(), GeoClipError> {
    let serialized = serde_json::to_string(feature)
        .map_err(|e| GeoClipError::Error(format!("Unable to serialize result: {}", e)))?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| {
                        GeoClipError::Io(format!(
                            "Unable to create '{}': {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
            let mut file = fs::File::create(path).map_err(|e| {
                GeoClipError::Io(format!("Unable to create '{}': {}", path.display(), e))
            })?;
            write!(file, "{}", serialized)
                .map_err(|e| GeoClipError::Io(format!("Unable to write output: {}", e)))
        }
        None => {
            let stdout = stdout();
            let mut handle = stdout.lock();
            write!(handle, "{}", serialized)
                .map_err(|e| GeoClipError::Io(format!("Unable to write output: {}", e)))
        }
    }
}
