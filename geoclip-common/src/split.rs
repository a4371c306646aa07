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

//! Splits a stream of concatenated JSON objects (no delimiter between them,
//! not array-wrapped, not newline-delimited) into one text fragment per
//! object. Boundaries are found with a brace-depth scan that tracks string
//! and escape state, so `{` and `}` inside string values never open or close
//! an object. This stage does not parse JSON; lexical validation happens
//! when each fragment is handed to `serde_json`.

use crate::error::GeoClipError;
use std::io::{BufReader, Bytes, Read};

/// Lazy iterator of JSON object fragments over any `Read` source.
///
/// An empty stream yields no fragments. Whitespace between objects is
/// dropped; any other content outside an object is carried into the
/// adjacent fragment so that its JSON parse fails downstream.
pub struct JsonObjectSplitter<R: Read> {
    bytes: Bytes<BufReader<R>>,
    done: bool,
}

impl<R: Read> JsonObjectSplitter<R> {
    pub fn new(read: R) -> Self {
        JsonObjectSplitter {
            bytes: BufReader::new(read).bytes(),
            done: false,
        }
    }
}

impl<R: Read> Iterator for JsonObjectSplitter<R> {
    type Item = Result<String, GeoClipError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut fragment: Vec<u8> = Vec::new();
        let mut depth = 0usize;
        let mut seen_object = false;
        let mut in_string = false;
        let mut escaped = false;

        loop {
            let byte = match self.bytes.next() {
                Some(Ok(byte)) => byte,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(GeoClipError::Io(format!(
                        "Error reading input: {}",
                        e
                    ))));
                }
                None => {
                    self.done = true;
                    // a trailing fragment that never closed (or junk after
                    // the last object) is emitted so its parse can fail
                    if fragment.iter().any(|b| !b.is_ascii_whitespace()) {
                        return Some(into_fragment(fragment));
                    }
                    return None;
                }
            };

            if fragment.is_empty() && byte.is_ascii_whitespace() {
                continue;
            }
            fragment.push(byte);

            if in_string {
                if escaped {
                    escaped = false;
                } else if byte == b'\\' {
                    escaped = true;
                } else if byte == b'"' {
                    in_string = false;
                }
                continue;
            }

            match byte {
                b'"' => in_string = true,
                b'{' => {
                    depth += 1;
                    seen_object = true;
                }
                b'}' => {
                    if depth > 0 {
                        depth -= 1;
                    }
                    if depth == 0 && seen_object {
                        return Some(into_fragment(fragment));
                    }
                }
                _ => {}
            }
        }
    }
}

fn into_fragment(bytes: Vec<u8>) -> Result<String, GeoClipError> {
    String::from_utf8(bytes)
        .map_err(|e| GeoClipError::InvalidJson(format!("input is not valid UTF-8: {}", e)))
}
