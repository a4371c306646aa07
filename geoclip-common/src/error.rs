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

use std::{error::Error, fmt};

/// Fatal errors. Any of these aborts the run; no partial output is written.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoClipError {
    /// A split fragment failed to parse as JSON.
    InvalidJson(String),
    /// Structurally invalid or unrecognized GeoJSON.
    InvalidGeoJson(String),
    /// A bounding box was requested for a geometry with no points.
    EmptyGeometry(String),
    Io(String),
    Error(String),
}

impl fmt::Display for GeoClipError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GeoClipError::InvalidJson(msg) => write!(f, "Invalid JSON: {}", msg),
            GeoClipError::InvalidGeoJson(msg) => write!(f, "Not GeoJSON: {}", msg),
            GeoClipError::EmptyGeometry(msg) => write!(f, "{}", msg),
            GeoClipError::Io(msg) => write!(f, "{}", msg),
            GeoClipError::Error(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for GeoClipError {}
