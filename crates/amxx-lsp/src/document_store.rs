// AMXX Pawn Language Engine
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-document cache of parse results.
//!
//! # Design
//!
//! The store keeps two independent maps:
//!
//! - **Open documents**: editor text (as a [`Rope`]), a content hash for
//!   change detection, the editor version, and the data from the last
//!   reparse in open mode.
//! - **Dependencies**: data for files reached through include directives,
//!   parsed in dependency mode from disk (or from the editor text when the
//!   file is also open).
//!
//! A file that is both open and included by another open document has an
//! entry in each map. Queries about the file itself use the open entry;
//! symbol aggregation for the including document uses the dependency entry.

use std::collections::HashMap;

use amxx_parser::{Callable, Value};
use ropey::Rope;
use tower_lsp::lsp_types::{Diagnostic, Range, Url};

use crate::utils::{content_hash, line_text};

/// An include directive that resolved to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInclusion {
    /// Resolved target.
    pub uri: Url,
    /// File name as written in the directive.
    pub filename: String,
    /// Range of the file name, delimiters included.
    pub range: Range,
}

/// Cached results for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentData {
    pub uri: Url,
    /// Findings from the last parse, engine diagnostics included.
    pub diagnostics: Vec<Diagnostic>,
    /// Callables declared in this file.
    pub callables: Vec<Callable>,
    /// Values declared in this file.
    pub values: Vec<Value>,
    /// Include directives that resolved, in source order.
    pub resolved_inclusions: Vec<ResolvedInclusion>,
    /// Dependency nodes this file holds a reference to. No duplicates.
    pub dependencies: Vec<Url>,
}

impl DocumentData {
    /// Empty data for `uri`.
    pub fn new(uri: Url) -> Self {
        Self {
            uri,
            diagnostics: Vec::new(),
            callables: Vec::new(),
            values: Vec::new(),
            resolved_inclusions: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}

/// A document open in the editor.
#[derive(Debug, Clone)]
pub struct OpenDocument {
    pub rope: Rope,
    pub content_hash: u64,
    pub version: i32,
    pub data: DocumentData,
}

impl OpenDocument {
    /// Current text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text of line `line` without its terminator.
    pub fn line(&self, line: u32) -> Option<String> {
        line_text(&self.rope, line)
    }
}

/// Open documents and cached dependency files.
#[derive(Debug, Default)]
pub struct DocumentStore {
    open: HashMap<Url, OpenDocument>,
    dependencies: HashMap<Url, DocumentData>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Open documents
    // ------------------------------------------------------------------

    /// Sets the editor text of `uri`, opening it if needed.
    ///
    /// Returns `true` if the text differs from what was stored (always
    /// `true` for a newly opened document).
    pub fn set_text(&mut self, uri: &Url, text: &str, version: i32) -> bool {
        let hash = content_hash(text);
        match self.open.get_mut(uri) {
            Some(doc) => {
                doc.version = version;
                if doc.content_hash == hash {
                    return false;
                }
                doc.rope = Rope::from_str(text);
                doc.content_hash = hash;
                true
            }
            None => {
                self.open.insert(
                    uri.clone(),
                    OpenDocument {
                        rope: Rope::from_str(text),
                        content_hash: hash,
                        version,
                        data: DocumentData::new(uri.clone()),
                    },
                );
                true
            }
        }
    }

    /// Removes an open document, returning it.
    pub fn close(&mut self, uri: &Url) -> Option<OpenDocument> {
        self.open.remove(uri)
    }

    pub fn is_open(&self, uri: &Url) -> bool {
        self.open.contains_key(uri)
    }

    pub fn get_open(&self, uri: &Url) -> Option<&OpenDocument> {
        self.open.get(uri)
    }

    /// Editor text of an open document.
    pub fn open_text(&self, uri: &Url) -> Option<String> {
        self.open.get(uri).map(OpenDocument::text)
    }

    /// Replaces the parse data of an open document. Ignored if not open.
    pub fn set_open_data(&mut self, data: DocumentData) {
        if let Some(doc) = self.open.get_mut(&data.uri) {
            doc.data = data;
        }
    }

    /// URIs of all open documents, sorted.
    pub fn open_uris(&self) -> Vec<Url> {
        let mut uris: Vec<Url> = self.open.keys().cloned().collect();
        uris.sort();
        uris
    }

    pub fn open_documents(&self) -> impl Iterator<Item = &OpenDocument> {
        self.open.values()
    }

    // ------------------------------------------------------------------
    // Dependency files
    // ------------------------------------------------------------------

    pub fn dependency(&self, uri: &Url) -> Option<&DocumentData> {
        self.dependencies.get(uri)
    }

    pub fn has_dependency(&self, uri: &Url) -> bool {
        self.dependencies.contains_key(uri)
    }

    pub fn insert_dependency(&mut self, data: DocumentData) {
        self.dependencies.insert(data.uri.clone(), data);
    }

    pub fn remove_dependency(&mut self, uri: &Url) -> Option<DocumentData> {
        self.dependencies.remove(uri)
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    pub fn dependency_uris(&self) -> impl Iterator<Item = &Url> {
        self.dependencies.keys()
    }

    // ------------------------------------------------------------------
    // Lookups for queries
    // ------------------------------------------------------------------

    /// Data describing `uri` itself: the open entry, else the dependency entry.
    pub fn data(&self, uri: &Url) -> Option<&DocumentData> {
        self.open
            .get(uri)
            .map(|doc| &doc.data)
            .or_else(|| self.dependencies.get(uri))
    }

    /// Data describing `uri` as seen by a file that includes it: the
    /// dependency entry, else the open entry.
    pub fn included(&self, uri: &Url) -> Option<&DocumentData> {
        self.dependencies
            .get(uri)
            .or_else(|| self.open.get(uri).map(|doc| &doc.data))
    }
}
