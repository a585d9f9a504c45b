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

//! Reparse orchestration.
//!
//! A [`Workspace`] owns the document store, the dependency graph and the
//! current settings. Every mutation (open, edit, close, configuration or
//! file-system change) runs one *pass*:
//!
//! 1. The changed file is parsed.
//! 2. Each include directive is resolved. Unresolved includes become
//!    diagnostics on the directive; resolved ones add a reference in the
//!    graph and, when the target has no cached entry yet, queue the target
//!    to be parsed in dependency mode. Targets are read from disk, or taken
//!    from the editor when open; this includes the changed file itself when
//!    an include cycle leads back to it.
//! 3. Queued files are processed the same way until the worklist is empty.
//!    A file queued once is not queued again in the same pass, which cuts
//!    include cycles; nesting is bounded by [`MAX_INCLUDE_DEPTH`].
//! 4. References a file no longer holds are released, and the graph is
//!    pruned of everything no open document can reach.
//!
//! The pass returns the complete diagnostics of every file it parsed plus an
//! empty list for every file it pruned, ready to be published. Nothing fails
//! out of a pass: unreadable files become warnings on the directive that
//! included them.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use amxx_parser::{IncludeDirective, ParseOptions};
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Range, Url};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::constants::{DEFAULT_MAX_DOCUMENT_SIZE, MAX_INCLUDE_DEPTH};
use crate::dependency_graph::DependencyGraph;
use crate::document_store::{DocumentData, DocumentStore, OpenDocument, ResolvedInclusion};
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::resolver::{path_to_uri, uri_to_path, IncludeResolver};
use crate::utils::{engine_diagnostic, to_lsp_diagnostic, to_range};

/// Diagnostics to publish, keyed by file.
pub type DiagnosticsMap = HashMap<Url, Vec<Diagnostic>>;

/// A file waiting to be parsed in the current pass.
struct Job {
    uri: Url,
    text: String,
    is_dependency: bool,
    depth: usize,
}

/// State of one reparse pass.
struct Pass {
    /// File the pass started from.
    root: Url,
    /// Files queued or parsed in dependency mode in this pass.
    queued: HashSet<Url>,
    worklist: VecDeque<Job>,
    published: DiagnosticsMap,
    parsed: usize,
}

impl Pass {
    fn new(root: Url) -> Self {
        Self {
            root,
            queued: HashSet::new(),
            worklist: VecDeque::new(),
            published: DiagnosticsMap::new(),
            parsed: 0,
        }
    }
}

/// Open documents, cached dependencies and the graph between them.
#[derive(Debug)]
pub struct Workspace {
    settings: Settings,
    root: Option<PathBuf>,
    max_document_size: usize,
    store: DocumentStore,
    graph: DependencyGraph,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Settings::default(), None)
    }
}

impl Workspace {
    /// Creates an empty workspace.
    ///
    /// `root` is the workspace folder used to expand `${workspaceFolder}`
    /// and to anchor relative include paths.
    pub fn new(settings: Settings, root: Option<PathBuf>) -> Self {
        Self {
            settings,
            root,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            store: DocumentStore::new(),
            graph: DependencyGraph::new(),
        }
    }

    /// Sets the maximum size of open documents and dependency files.
    pub fn with_max_document_size(mut self, max: usize) -> Self {
        self.max_document_size = max;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings. Takes effect on the next pass; call
    /// [`Workspace::reparse_all`] to apply it to every open document.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn set_root(&mut self, root: Option<PathBuf>) {
        self.root = root;
    }

    pub fn max_document_size(&self) -> usize {
        self.max_document_size
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// An open document.
    pub fn document(&self, uri: &Url) -> Option<&OpenDocument> {
        self.store.get_open(uri)
    }

    // ------------------------------------------------------------------
    // Document lifecycle
    // ------------------------------------------------------------------

    /// Opens a document and reparses it immediately.
    ///
    /// # Errors
    ///
    /// [`WorkspaceError::TooLarge`] if the text is above the size limit; the
    /// document is not opened.
    pub fn open(&mut self, uri: &Url, text: &str, version: i32) -> WorkspaceResult<DiagnosticsMap> {
        self.check_size(uri, text.len())?;
        self.store.set_text(uri, text, version);
        info!("Opened {} ({} bytes)", uri, text.len());
        Ok(self.reparse(uri))
    }

    /// Stores new editor text without reparsing.
    ///
    /// Returns `true` if the text changed. Unknown documents are opened.
    pub fn update(&mut self, uri: &Url, text: &str, version: i32) -> WorkspaceResult<bool> {
        self.check_size(uri, text.len())?;
        Ok(self.store.set_text(uri, text, version))
    }

    /// Closes a document.
    ///
    /// If another open document still includes the file, its dependency
    /// entry is re-read from disk so unsaved editor text stops being
    /// visible; otherwise its diagnostics are cleared.
    pub fn close(&mut self, uri: &Url) -> DiagnosticsMap {
        let Some(doc) = self.store.close(uri) else {
            return DiagnosticsMap::new();
        };
        info!("Closed {}", uri);

        let still_listed = self
            .store
            .dependency(uri)
            .map(|d| d.dependencies.clone())
            .unwrap_or_default();
        self.graph.release_references(
            uri,
            doc.data.dependencies.iter().filter(|d| !still_listed.contains(d)),
        );

        if self.store.has_dependency(uri) {
            return self.refresh_dependency(uri);
        }

        let mut published = DiagnosticsMap::new();
        for removed in self.graph.prune_unreachable(&mut self.store) {
            if !self.store.is_open(&removed) {
                published.insert(removed, Vec::new());
            }
        }
        published.insert(uri.clone(), Vec::new());
        published
    }

    // ------------------------------------------------------------------
    // Passes
    // ------------------------------------------------------------------

    /// Reparses an open document and everything newly reachable from it.
    ///
    /// Returns no diagnostics if the document is not open.
    pub fn reparse(&mut self, uri: &Url) -> DiagnosticsMap {
        let Some(text) = self.store.open_text(uri) else {
            debug!("Skipping reparse of {}: not open", uri);
            return DiagnosticsMap::new();
        };

        let mut pass = Pass::new(uri.clone());
        // Files including this one see the edit in the same pass.
        if self.store.has_dependency(uri) {
            pass.queued.insert(uri.clone());
            pass.worklist.push_back(Job {
                uri: uri.clone(),
                text: text.clone(),
                is_dependency: true,
                depth: 0,
            });
        }
        pass.worklist.push_front(Job {
            uri: uri.clone(),
            text,
            is_dependency: false,
            depth: 0,
        });
        self.run(pass)
    }

    /// Re-reads a cached dependency file from disk and reparses it.
    ///
    /// Does nothing for files that are not cached or that are open in the
    /// editor (the editor text wins). A file that can no longer be read is
    /// treated as empty, which releases everything it included.
    pub fn refresh_dependency(&mut self, uri: &Url) -> DiagnosticsMap {
        if !self.store.has_dependency(uri) || self.store.is_open(uri) {
            return DiagnosticsMap::new();
        }
        let text = match self.load(uri) {
            Ok(text) => text,
            Err(err) => {
                warn!("Failed to refresh dependency {}: {}", uri, err);
                String::new()
            }
        };
        let mut pass = Pass::new(uri.clone());
        pass.queued.insert(uri.clone());
        pass.worklist.push_back(Job {
            uri: uri.clone(),
            text,
            is_dependency: true,
            depth: 0,
        });
        self.run(pass)
    }

    /// Drops every cached dependency and reparses all open documents.
    ///
    /// Used after a configuration change, since include search paths may
    /// now resolve differently.
    pub fn reparse_all(&mut self) -> DiagnosticsMap {
        let cached: Vec<Url> = self.store.dependency_uris().cloned().collect();
        for uri in cached {
            if let Some(data) = self.store.remove_dependency(&uri) {
                let open_deps = self
                    .store
                    .get_open(&uri)
                    .map(|d| d.data.dependencies.clone())
                    .unwrap_or_default();
                self.graph.release_references(
                    &uri,
                    data.dependencies.iter().filter(|d| !open_deps.contains(d)),
                );
            }
        }

        let mut published = DiagnosticsMap::new();
        for uri in self.store.open_uris() {
            published.extend(self.reparse(&uri));
        }
        published
    }

    fn run(&mut self, mut pass: Pass) -> DiagnosticsMap {
        while let Some(job) = pass.worklist.pop_front() {
            self.process(&mut pass, job);
        }

        let pruned = self.graph.prune_unreachable(&mut self.store);
        for uri in &pruned {
            if !self.store.is_open(uri) {
                pass.published.insert(uri.clone(), Vec::new());
            }
        }
        debug!(
            "Pass from {}: {} files parsed, {} pruned, {} dependencies cached",
            pass.root,
            pass.parsed,
            pruned.len(),
            self.store.dependency_count()
        );
        pass.published
    }

    fn process(&mut self, pass: &mut Pass, job: Job) {
        pass.parsed += 1;
        let options = if job.is_dependency {
            ParseOptions::dependency()
        } else {
            ParseOptions::default()
        };
        let result = amxx_parser::parse(&job.text, options);
        let mut diagnostics: Vec<Diagnostic> =
            result.diagnostics.iter().map(to_lsp_diagnostic).collect();

        let path = uri_to_path(&job.uri).ok();
        let resolver = IncludeResolver::new(
            self.settings
                .search_paths_for(self.root.as_deref(), path.as_deref()),
        );
        let previous = self
            .entry(&job.uri, job.is_dependency)
            .map(|d| d.dependencies.clone())
            .unwrap_or_default();

        let mut dependencies: Vec<Url> = Vec::new();
        let mut resolved_inclusions = Vec::new();

        for include in &result.includes {
            let range = to_range(include.span);
            let target = path
                .as_deref()
                .and_then(|p| resolver.resolve(&include.filename, include.is_local, p))
                .and_then(|p| path_to_uri(&p));
            let Some(target) = target else {
                diagnostics.push(unresolved_include(include, range));
                continue;
            };

            if target == job.uri {
                continue;
            }

            if !dependencies.contains(&target) {
                self.graph.add_reference(&job.uri, &target);
                dependencies.push(target.clone());
            }

            if !self.store.has_dependency(&target) && pass.queued.insert(target.clone()) {
                if job.depth >= MAX_INCLUDE_DEPTH {
                    warn!("Include depth limit reached at {} in {}", target, job.uri);
                    diagnostics.push(engine_diagnostic(
                        range,
                        DiagnosticSeverity::WARNING,
                        format!(
                            "Includes are nested deeper than {} levels; '{}' was not read.",
                            MAX_INCLUDE_DEPTH, include.filename
                        ),
                    ));
                } else {
                    match self.load(&target) {
                        Ok(text) => pass.worklist.push_back(Job {
                            uri: target.clone(),
                            text,
                            is_dependency: true,
                            depth: job.depth + 1,
                        }),
                        Err(err) => {
                            warn!("Failed to read dependency {}: {}", target, err);
                            diagnostics.push(engine_diagnostic(
                                range,
                                DiagnosticSeverity::WARNING,
                                format!(
                                    "Couldn't read included file '{}': {}",
                                    include.filename, err
                                ),
                            ));
                            self.store.insert_dependency(DocumentData::new(target.clone()));
                        }
                    }
                }
            }

            resolved_inclusions.push(ResolvedInclusion {
                uri: target,
                filename: include.filename.clone(),
                range,
            });
        }

        // A file both open and cached holds one set of references for both
        // entries; only drop what neither entry lists any more.
        let other_entry = self
            .entry(&job.uri, !job.is_dependency)
            .map(|d| d.dependencies.clone())
            .unwrap_or_default();
        self.graph.release_references(
            &job.uri,
            previous
                .iter()
                .filter(|d| !dependencies.contains(d) && !other_entry.contains(d)),
        );

        if !(job.is_dependency && self.store.is_open(&job.uri)) {
            pass.published.insert(job.uri.clone(), diagnostics.clone());
        }

        let data = DocumentData {
            uri: job.uri,
            diagnostics,
            callables: result.callables,
            values: result.values,
            resolved_inclusions,
            dependencies,
        };
        if job.is_dependency {
            self.store.insert_dependency(data);
        } else {
            self.store.set_open_data(data);
        }
    }

    fn entry(&self, uri: &Url, is_dependency: bool) -> Option<&DocumentData> {
        if is_dependency {
            self.store.dependency(uri)
        } else {
            self.store.get_open(uri).map(|doc| &doc.data)
        }
    }

    /// Text of a file to parse as a dependency: the editor text if the file
    /// is open, otherwise the file on disk.
    fn load(&self, uri: &Url) -> WorkspaceResult<String> {
        if let Some(text) = self.store.open_text(uri) {
            return Ok(text);
        }
        let path = uri_to_path(uri)?;
        let size = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(source) => return Err(WorkspaceError::Read { path, source }),
        };
        if size > self.max_document_size as u64 {
            return Err(WorkspaceError::TooLarge {
                path,
                size,
                max: self.max_document_size,
            });
        }
        fs::read_to_string(&path).map_err(|source| WorkspaceError::Read { path, source })
    }

    fn check_size(&self, uri: &Url, size: usize) -> WorkspaceResult<()> {
        if size <= self.max_document_size {
            return Ok(());
        }
        Err(WorkspaceError::TooLarge {
            path: uri_to_path(uri).unwrap_or_else(|_| PathBuf::from(uri.path())),
            size: size as u64,
            max: self.max_document_size,
        })
    }
}

fn unresolved_include(include: &IncludeDirective, range: Range) -> Diagnostic {
    let severity = if include.is_silent {
        DiagnosticSeverity::INFORMATION
    } else {
        DiagnosticSeverity::ERROR
    };
    engine_diagnostic(
        range,
        severity,
        format!(
            "Couldn't resolve include path '{}'. Check compiler include paths.",
            include.filename
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(path: &str) -> Url {
        Url::parse(&format!("file://{}", path)).unwrap()
    }

    #[test]
    fn test_document_without_includes() {
        let mut ws = Workspace::default();
        let main = uri("/nowhere/main.sma");
        let published = ws.open(&main, "new x;\npublic f() {}\n", 1).unwrap();

        assert_eq!(published.len(), 1);
        assert!(published[&main].is_empty());
        let data = &ws.document(&main).unwrap().data;
        assert!(data.dependencies.is_empty());
        assert_eq!(data.callables.len(), 1);
        assert!(ws.graph().is_empty());
    }

    #[test]
    fn test_unresolved_include_severity() {
        let mut ws = Workspace::default();
        let main = uri("/nowhere/main.sma");
        let published = ws
            .open(&main, "#include <missing>\n#tryinclude <optional>\n", 1)
            .unwrap();
        let diags = &published[&main];
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(
            diags[0].message,
            "Couldn't resolve include path 'missing'. Check compiler include paths."
        );
        assert_eq!(diags[0].range, Range::new(
            tower_lsp::lsp_types::Position::new(0, 9),
            tower_lsp::lsp_types::Position::new(0, 18),
        ));
        assert_eq!(diags[1].severity, Some(DiagnosticSeverity::INFORMATION));
    }

    #[test]
    fn test_open_rejects_large_documents() {
        let mut ws = Workspace::default().with_max_document_size(8);
        let main = uri("/nowhere/main.sma");
        let err = ws.open(&main, "new a_long_name;", 1).unwrap_err();
        assert!(matches!(err, WorkspaceError::TooLarge { size: 16, max: 8, .. }));
        assert!(ws.document(&main).is_none());
    }

    #[test]
    fn test_update_reports_changes() {
        let mut ws = Workspace::default();
        let main = uri("/nowhere/main.sma");
        ws.open(&main, "new a;", 1).unwrap();
        assert!(!ws.update(&main, "new a;", 2).unwrap());
        assert!(ws.update(&main, "new b;", 3).unwrap());
        // Not reparsed yet.
        assert_eq!(ws.document(&main).unwrap().data.values[0].name, "a");
        ws.reparse(&main);
        assert_eq!(ws.document(&main).unwrap().data.values[0].name, "b");
    }

    #[test]
    fn test_close_clears_diagnostics() {
        let mut ws = Workspace::default();
        let main = uri("/nowhere/main.sma");
        ws.open(&main, "#include <missing>\n", 1).unwrap();
        let published = ws.close(&main);
        assert_eq!(published.get(&main), Some(&Vec::new()));
        assert!(ws.document(&main).is_none());
        assert!(ws.close(&main).is_empty());
    }

    #[test]
    fn test_reparse_unknown_document() {
        let mut ws = Workspace::default();
        assert!(ws.reparse(&uri("/nowhere/ghost.sma")).is_empty());
        assert!(ws.refresh_dependency(&uri("/nowhere/ghost.inc")).is_empty());
    }
}
