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

//! Antimeridian-aware bounding boxes, used to prune inputs that cannot
//! overlap the subject before any geometric work is done. Pruning is a
//! performance shortcut only; retaining everything is always correct.

use crate::{error::GeoClipError, geometry::MultiPoly};
use nom::{do_parse, map_res, named, tag, take_while1, types::CompleteStr};
use std::num::ParseFloatError;
use std::path::PathBuf;

/// A `[west, south, east, north]` box. `west > east` denotes a box that
/// crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Move a longitude between "0 is the prime meridian" and "0 is the
/// antimeridian" frames.
fn flip_coord(x: f64) -> f64 {
    if x > 0.0 {
        x - 180.0
    } else {
        x + 180.0
    }
}

impl BoundingBox {
    /// Scan every coordinate of the multipolygon, computing the box under
    /// both seam hypotheses (cut on the antimeridian vs on the prime
    /// meridian) and keeping whichever has the smaller east-west extent.
    pub fn from_multi_poly(multi_poly: &MultiPoly) -> Result<Self, GeoClipError> {
        let mut south = f64::INFINITY;
        let mut north = f64::NEG_INFINITY;
        let mut west_am = f64::INFINITY;
        let mut east_am = f64::NEG_INFINITY;
        let mut west_pm = f64::INFINITY;
        let mut east_pm = f64::NEG_INFINITY;

        for poly in multi_poly {
            for ring in poly {
                for coord in ring {
                    let (x, y) = (coord[0], coord[1]);
                    south = south.min(y);
                    north = north.max(y);
                    west_am = west_am.min(x);
                    east_am = east_am.max(x);
                    west_pm = west_pm.min(flip_coord(x));
                    east_pm = east_pm.max(flip_coord(x));
                }
            }
        }

        if south == f64::INFINITY {
            return Err(GeoClipError::EmptyGeometry(
                "Unable to compute bbox: no points in multipoly".to_string(),
            ));
        }

        if east_pm - west_pm < east_am - west_am {
            Ok(BoundingBox {
                west: flip_coord(west_pm),
                south,
                east: flip_coord(east_pm),
                north,
            })
        } else {
            Ok(BoundingBox {
                west: west_am,
                south,
                east: east_am,
                north,
            })
        }
    }

    /// Extract a `[w,s,e,n]` literal embedded anywhere in a file name.
    /// The first occurrence wins; returns `None` if there is none.
    pub fn from_file_name(name: &str) -> Option<Self> {
        for (index, _) in name.match_indices('[') {
            if let Ok((_, bbox)) = parse_bbox_literal(CompleteStr(&name[index..])) {
                return Some(bbox);
            }
        }
        None
    }

    /// True if both the latitude and (possibly antimeridian-wrapping)
    /// longitude ranges intersect. Symmetric.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        if other.north < self.south || self.north < other.south {
            return false;
        }
        is_between(self.west, self.east, other.west)
            || is_between(other.west, other.east, self.west)
    }
}

/// Longitude range membership, supporting wrapping ranges (west > east).
fn is_between(west: f64, east: f64, spot: f64) -> bool {
    if west <= east {
        west <= spot && spot <= east
    } else {
        (west <= spot && spot <= 180.0) || (spot >= -180.0 && spot <= east)
    }
}

fn parse_f64(s: CompleteStr) -> Result<f64, ParseFloatError> {
    s.parse::<f64>()
}

fn is_number_char(c: char) -> bool {
    c.is_digit(10) || c == '-' || c == '.'
}

named!(
    parse_number<CompleteStr, f64>,
    map_res!(take_while1!(is_number_char), parse_f64)
);

named!(
    parse_bbox_literal<CompleteStr, BoundingBox>,
    do_parse!(
        tag!("[") >>
        west: parse_number >>
        tag!(",") >>
        south: parse_number >>
        tag!(",") >>
        east: parse_number >>
        tag!(",") >>
        north: parse_number >>
        tag!("]") >>
        (BoundingBox { west, south, east, north })
    )
);

/// Retain paths that either carry no bounding box in their name (they cannot
/// be ruled out) or whose embedded box overlaps `bbox`. Order-preserving.
pub fn filter_paths(paths: Vec<PathBuf>, bbox: &BoundingBox) -> Vec<PathBuf> {
    paths
        .into_iter()
        .filter(
            |path| match BoundingBox::from_file_name(&path.to_string_lossy()) {
                Some(file_bbox) => bbox.overlaps(&file_bbox),
                None => true,
            },
        )
        .collect()
}

/// Retain multipolygons whose computed box overlaps `bbox`. Order-preserving.
pub fn filter_multi_polys(
    multi_polys: Vec<MultiPoly>,
    bbox: &BoundingBox,
) -> Result<Vec<MultiPoly>, GeoClipError> {
    let mut retained = Vec::new();
    for multi_poly in multi_polys {
        if bbox.overlaps(&BoundingBox::from_multi_poly(&multi_poly)?) {
            retained.push(multi_poly);
        }
    }
    Ok(retained)
}
