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

//! Resolves and reads the ordered list of input sources. The subject (if
//! any) comes first, then piped stdin, then positional files and
//! directories in the order given. The first multipolygon parsed from the
//! subject/stdin stream anchors bbox pruning when it is requested.

use geoclip_common::{
    bbox::{self, BoundingBox},
    error::GeoClipError,
    geometry::MultiPoly,
    parse,
    split::JsonObjectSplitter,
};
use itertools::Itertools;
use std::{
    fs::File,
    io::{stdin, Read},
    path::{Path, PathBuf},
};

const GEOJSON_EXTENSION: &str = "geojson";

/// An input source, resolved once up front before any reads begin.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Subject(PathBuf),
    Stdin,
    File(PathBuf),
    Dir(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct GatherOptions {
    pub subject: Option<PathBuf>,
    pub read_stdin: bool,
    pub use_bboxes: bool,
}

/// Resolve positionals and options into a concrete ordered source list.
/// Nonexistent positional paths are fatal here, before any parsing starts.
pub fn resolve_sources(
    positionals: &[PathBuf],
    opts: &GatherOptions,
) -> Result<Vec<InputSource>, GeoClipError> {
    let mut sources = Vec::new();
    if let Some(subject) = &opts.subject {
        sources.push(InputSource::Subject(subject.clone()));
    }
    if opts.read_stdin {
        sources.push(InputSource::Stdin);
    }
    for positional in positionals {
        let metadata = std::fs::metadata(positional).map_err(|e| {
            GeoClipError::Io(format!("Unable to read '{}': {}", positional.display(), e))
        })?;
        if metadata.is_dir() {
            sources.push(InputSource::Dir(positional.clone()));
        } else {
            sources.push(InputSource::File(positional.clone()));
        }
    }
    Ok(sources)
}

/// Read every concatenated GeoJSON object from the stream, one multipolygon
/// per object.
pub fn read_multi_polys<R: Read>(
    read: R,
    warn: &mut dyn FnMut(&str),
) -> Result<Vec<MultiPoly>, GeoClipError> {
    let mut multi_polys = Vec::new();
    for fragment in JsonObjectSplitter::new(read) {
        let fragment = fragment?;
        let value: serde_json::Value = serde_json::from_str(&fragment)
            .map_err(|e| GeoClipError::InvalidJson(format!("{}", e)))?;
        multi_polys.push(parse::parse(&value, warn)?);
    }
    Ok(multi_polys)
}

fn read_multi_polys_from_path(
    path: &Path,
    warn: &mut dyn FnMut(&str),
) -> Result<Vec<MultiPoly>, GeoClipError> {
    let file = File::open(path)
        .map_err(|e| GeoClipError::Io(format!("Unable to open '{}': {}", path.display(), e)))?;
    read_multi_polys(file, warn)
}

/// The `.geojson` files directly inside `dir` (non-recursive), in
/// lexicographic order.
pub fn geojson_files_in_dir(dir: &Path) -> Result<Vec<PathBuf>, GeoClipError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| GeoClipError::Io(format!("Unable to read '{}': {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| GeoClipError::Io(format!("Unable to read '{}': {}", dir.display(), e)))?;
        let path = entry.path();
        let is_geojson = path
            .extension()
            .map(|ext| ext == GEOJSON_EXTENSION)
            .unwrap_or(false);
        if path.is_file() && is_geojson {
            files.push(path);
        }
    }
    Ok(files.into_iter().sorted().collect())
}

/// Gather every input multipolygon, subject/stdin first, then positionals.
///
/// With `use_bboxes` set, the first subject/stdin multipolygon's bounding
/// box filters both the candidate file paths (by the filename heuristic)
/// and every subsequent parsed multipolygon (by computed box). If no usable
/// subject exists the result is empty: nothing can overlap a box that does
/// not exist.
pub fn gather_inputs(
    positionals: &[PathBuf],
    opts: &GatherOptions,
    warn: &mut dyn FnMut(&str),
) -> Result<Vec<MultiPoly>, GeoClipError> {
    let sources = resolve_sources(positionals, opts)?;

    let mut head = Vec::new();
    let mut candidate_paths = Vec::new();
    for source in sources {
        match source {
            InputSource::Subject(path) => {
                head.extend(read_multi_polys_from_path(&path, warn)?);
            }
            InputSource::Stdin => {
                let stdin = stdin();
                let handle = stdin.lock();
                head.extend(read_multi_polys(handle, warn)?);
            }
            InputSource::File(path) => candidate_paths.push(path),
            InputSource::Dir(path) => candidate_paths.extend(geojson_files_in_dir(&path)?),
        }
    }

    if !opts.use_bboxes {
        let mut multi_polys = head;
        for path in candidate_paths {
            multi_polys.extend(read_multi_polys_from_path(&path, warn)?);
        }
        return Ok(multi_polys);
    }

    let mut head_iter = head.into_iter();
    let subject = match head_iter.next() {
        Some(multi_poly) if !multi_poly.is_empty() => multi_poly,
        _ => return Ok(Vec::new()),
    };
    let subject_bbox = BoundingBox::from_multi_poly(&subject)?;

    let mut multi_polys = vec![subject];
    multi_polys.extend(bbox::filter_multi_polys(
        head_iter.collect(),
        &subject_bbox,
    )?);

    let mut positional_multi_polys = Vec::new();
    for path in bbox::filter_paths(candidate_paths, &subject_bbox) {
        positional_multi_polys.extend(read_multi_polys_from_path(&path, warn)?);
    }
    multi_polys.extend(bbox::filter_multi_polys(
        positional_multi_polys,
        &subject_bbox,
    )?);

    Ok(multi_polys)
}
