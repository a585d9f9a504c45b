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

//! Crate-level tests for the reparse orchestrator.
//!
//! These drive a [`Workspace`] over real include trees in a temporary
//! directory and check the graph and store invariants after each step.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use tower_lsp::lsp_types::{DiagnosticSeverity, Url};

use crate::aggregate::AggregatedSymbols;
use crate::config::Settings;
use crate::resolver::{normalize_path, path_to_uri};
use crate::workspace::{DiagnosticsMap, Workspace};

/// A workspace rooted in a temporary directory.
pub(crate) struct Fixture {
    dir: TempDir,
    pub workspace: Workspace,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        Self {
            dir,
            workspace: Workspace::new(settings, Some(root)),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        normalize_path(&self.dir.path().join(name))
    }

    pub fn uri(&self, name: &str) -> Url {
        path_to_uri(&self.path(name)).unwrap()
    }

    pub fn write(&self, name: &str, text: &str) {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    /// Writes `name` to disk and opens it with the same text.
    pub fn open(&mut self, name: &str, text: &str) -> Url {
        self.open_published(name, text).0
    }

    pub fn open_published(&mut self, name: &str, text: &str) -> (Url, DiagnosticsMap) {
        self.write(name, text);
        let uri = self.uri(name);
        let published = self.workspace.open(&uri, text, 1).unwrap();
        (uri, published)
    }

    pub fn edit(&mut self, uri: &Url, text: &str) -> DiagnosticsMap {
        self.workspace.update(uri, text, 2).unwrap();
        self.workspace.reparse(uri)
    }

    /// Checks the reference counts against the store.
    ///
    /// Every node is referenced exactly by the files whose open or cached
    /// entry lists it, every node is referenced at all, and every cached
    /// dependency has a node.
    pub fn assert_consistent(&self) {
        let store = self.workspace.store();
        let graph = self.workspace.graph();

        for node in graph.nodes() {
            let mut expected: HashSet<&Url> = HashSet::new();
            for doc in store.open_documents() {
                if doc.data.dependencies.contains(node.uri()) {
                    expected.insert(&doc.data.uri);
                }
            }
            for uri in store.dependency_uris() {
                let data = store.dependency(uri).unwrap();
                if data.dependencies.contains(node.uri()) {
                    expected.insert(uri);
                }
            }
            let actual: HashSet<&Url> = node.referrers().collect();
            assert_eq!(actual, expected, "referrers of {}", node.uri());
            assert!(node.ref_count() > 0, "unreferenced node {}", node.uri());
            assert!(!node.is_referenced_by(node.uri()), "self edge on {}", node.uri());
        }
        for uri in store.dependency_uris() {
            assert!(graph.contains(uri), "cached dependency {} has no node", uri);
        }
    }

    pub fn visible_callables(&self, uri: &Url) -> Vec<String> {
        AggregatedSymbols::collect(self.workspace.store(), uri)
            .callables
            .iter()
            .map(|c| c.symbol.name.clone())
            .collect()
    }
}

mod orchestrator_tests {
    use super::*;
    use crate::constants::MAX_INCLUDE_DEPTH;

    #[test]
    fn test_reparse_is_idempotent() {
        let mut fx = Fixture::new();
        fx.write("util.inc", "stock add(a, b) { return a + b; }\nnative broken(\n");
        let (main, first) = fx.open_published("main.sma", "#include \"util\"\n#include <nope>\n");
        let symbols = fx.visible_callables(&main);

        let second = fx.workspace.reparse(&main);
        assert_eq!(first.get(&main), second.get(&main));
        assert_eq!(fx.visible_callables(&main), symbols);
        fx.assert_consistent();
    }

    #[test]
    fn test_dependency_diagnostics_are_published() {
        let mut fx = Fixture::new();
        fx.write("util.inc", "native broken(\n");
        let (_, published) = fx.open_published("main.sma", "#include \"util\"\n");
        let util = &published[&fx.uri("util.inc")];
        assert_eq!(util.len(), 1);
        assert_eq!(util[0].severity, Some(DiagnosticSeverity::ERROR));
    }

    #[test]
    fn test_include_cycle_between_headers() {
        let mut fx = Fixture::new();
        fx.write("a.inc", "#include \"b\"\nnative a_fn();\n");
        fx.write("b.inc", "#include \"a\"\nnative b_fn();\n");
        let main = fx.open("main.sma", "#include \"a\"\n");

        let graph = fx.workspace.graph();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.ref_count(&fx.uri("a.inc")), 2);
        assert_eq!(graph.ref_count(&fx.uri("b.inc")), 1);
        assert_eq!(fx.visible_callables(&main), vec!["a_fn", "b_fn"]);
        fx.assert_consistent();

        // Dropping the only include from an open file frees the whole cycle.
        fx.edit(&main, "");
        assert!(fx.workspace.graph().is_empty());
        assert_eq!(fx.workspace.store().dependency_count(), 0);
    }

    #[test]
    fn test_cycle_back_to_open_document() {
        let mut fx = Fixture::new();
        fx.write("helper.inc", "#include \"main.sma\"\nnative helper();\n");
        let main = fx.open("main.sma", "#include \"helper\"\npublic f() {}\n");
        let helper = fx.uri("helper.inc");

        // The open document is cached from its editor text for the header
        // that includes it.
        assert_eq!(fx.workspace.graph().ref_count(&main), 1);
        assert!(fx.workspace.graph().get(&main).unwrap().is_referenced_by(&helper));
        assert!(fx.workspace.store().has_dependency(&main));
        let cached = fx.workspace.store().dependency(&helper).unwrap();
        assert_eq!(cached.resolved_inclusions.len(), 1);
        assert_eq!(cached.resolved_inclusions[0].uri, main);
        fx.assert_consistent();

        fx.workspace.close(&main);
        assert!(fx.workspace.graph().is_empty());
        assert_eq!(fx.workspace.store().dependency_count(), 0);
    }

    #[test]
    fn test_shared_header_independent_of_open_order() {
        const MAIN: &str = "#include \"b.inc\"\nstock main_fn() {}\n";
        const HEADER: &str = "#include \"main.sma\"\nstock b_fn() {}\n";
        const OTHER: &str = "#include \"b.inc\"\n";

        let mut alone = Fixture::new();
        alone.write("main.sma", MAIN);
        alone.write("b.inc", HEADER);
        let other = alone.open("d.sma", OTHER);
        let expected = alone.visible_callables(&other);
        assert_eq!(expected, vec!["b_fn", "main_fn"]);

        let mut fx = Fixture::new();
        fx.write("b.inc", HEADER);
        let main = fx.open("main.sma", MAIN);
        let other = fx.open("d.sma", OTHER);
        assert_eq!(fx.visible_callables(&other), expected);
        fx.assert_consistent();

        fx.workspace.close(&main);
        assert_eq!(fx.visible_callables(&other), expected);
        fx.assert_consistent();
    }

    #[test]
    fn test_duplicate_include_counts_once() {
        let mut fx = Fixture::new();
        fx.write("util.inc", "native u();\n");
        let main = fx.open("main.sma", "#include \"util\"\n#include \"util.inc\"\n");
        assert_eq!(fx.workspace.graph().ref_count(&fx.uri("util.inc")), 1);
        let data = &fx.workspace.document(&main).unwrap().data;
        assert_eq!(data.dependencies.len(), 1);
        assert_eq!(data.resolved_inclusions.len(), 2);
    }

    #[test]
    fn test_editing_open_dependency_updates_dependents() {
        let mut fx = Fixture::new();
        let util_text = "native first();\n";
        fx.write("util.inc", util_text);
        let main = fx.open("main.sma", "#include \"util\"\n");
        let (util, _) = fx.open_published("util.inc", util_text);

        let published = fx.edit(&util, "native first();\nnative second();\nnative oops(\n");
        assert_eq!(fx.visible_callables(&main), vec!["first", "second"]);
        // Open-mode diagnostics only, never the dependency-mode copy.
        assert_eq!(published[&util].len(), 1);
        fx.assert_consistent();
    }

    #[test]
    fn test_closing_open_dependency_reverts_to_disk() {
        let mut fx = Fixture::new();
        fx.write("util.inc", "native on_disk();\n");
        let main = fx.open("main.sma", "#include \"util\"\n");
        let util = fx.uri("util.inc");
        fx.workspace.open(&util, "native unsaved();\n", 1).unwrap();
        fx.workspace.reparse(&util);
        assert_eq!(fx.visible_callables(&main), vec!["unsaved"]);

        let published = fx.workspace.close(&util);
        assert_eq!(fx.visible_callables(&main), vec!["on_disk"]);
        assert!(published.contains_key(&util));
        assert!(fx.workspace.store().has_dependency(&util));
        fx.assert_consistent();
    }

    #[test]
    fn test_refresh_dependency_from_disk() {
        let mut fx = Fixture::new();
        fx.write("util.inc", "native old();\n");
        let main = fx.open("main.sma", "#include \"util\"\n");
        let util = fx.uri("util.inc");

        fx.write("util.inc", "#include \"extra\"\nnative new_fn();\n");
        fx.write("extra.inc", "native extra();\n");
        let published = fx.workspace.refresh_dependency(&util);
        assert!(published.contains_key(&util));
        assert_eq!(fx.visible_callables(&main), vec!["new_fn", "extra"]);
        fx.assert_consistent();

        // Deleting the file empties its entry and frees what it included.
        fs::remove_file(fx.path("util.inc")).unwrap();
        fx.workspace.refresh_dependency(&util);
        assert!(fx.visible_callables(&main).is_empty());
        assert!(!fx.workspace.graph().contains(&fx.uri("extra.inc")));
        fx.assert_consistent();
    }

    #[test]
    fn test_unreadable_dependency_becomes_warning() {
        let mut fx = Fixture::new();
        fs::write(fx.path("binary.inc"), [0xff, 0xfe, 0x00, 0x41]).unwrap();
        let (main, published) = fx.open_published("main.sma", "#include \"binary\"\n");

        let diags = &published[&main];
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Some(DiagnosticSeverity::WARNING));
        assert!(diags[0].message.starts_with("Couldn't read included file 'binary'"));
        // Resolved but empty.
        let binary = fx.uri("binary.inc");
        assert!(fx.workspace.store().has_dependency(&binary));
        assert_eq!(fx.workspace.graph().ref_count(&binary), 1);
        fx.assert_consistent();
    }

    #[test]
    fn test_oversized_dependency_is_skipped() {
        let mut fx = Fixture::new();
        fx.workspace =
            Workspace::new(Settings::default(), Some(fx.path(""))).with_max_document_size(64);
        fx.write("big.inc", &"native f();\n".repeat(20));
        let (main, published) = fx.open_published("main.sma", "#include \"big\"\n");
        let diags = &published[&main];
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("byte limit"), "{}", diags[0].message);
        assert!(fx.visible_callables(&main).is_empty());
    }

    #[test]
    fn test_include_depth_is_bounded() {
        let mut fx = Fixture::new();
        let chain = MAX_INCLUDE_DEPTH + 5;
        for i in 1..=chain {
            let text = format!("#include \"h{}\"\nnative f{}();\n", i + 1, i);
            fx.write(&format!("h{}.inc", i), &text);
        }
        let (_, published) = fx.open_published("main.sma", "#include \"h1\"\n");

        assert_eq!(fx.workspace.store().dependency_count(), MAX_INCLUDE_DEPTH);
        let deepest = fx.uri(&format!("h{}.inc", MAX_INCLUDE_DEPTH));
        let diags = &published[&deepest];
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Some(DiagnosticSeverity::WARNING));
        fx.assert_consistent();
    }

    #[test]
    fn test_settings_change_re_resolves_includes() {
        let mut settings = Settings::default();
        settings.compiler.include_paths = vec!["first".to_string()];
        let mut fx = Fixture::with_settings(settings.clone());
        fx.write("first/lib.inc", "native from_first();\n");
        fx.write("second/lib.inc", "native from_second();\n");
        let main = fx.open("main.sma", "#include <lib>\n");
        assert_eq!(fx.visible_callables(&main), vec!["from_first"]);

        settings.compiler.include_paths = vec!["second".to_string()];
        fx.workspace.set_settings(settings);
        let published = fx.workspace.reparse_all();
        assert_eq!(fx.visible_callables(&main), vec!["from_second"]);
        assert_eq!(published.get(&fx.uri("first/lib.inc")), Some(&Vec::new()));
        assert!(!fx.workspace.graph().contains(&fx.uri("first/lib.inc")));
        fx.assert_consistent();
    }

    #[test]
    fn test_random_sequence_keeps_invariants() {
        let mut fx = Fixture::new();
        fx.write("a.inc", "#include \"c\"\nnative a();\n");
        fx.write("b.inc", "#include \"c\"\nnative b();\n");
        fx.write("c.inc", "#include \"a\"\nnative c();\n");

        let one = fx.open("one.sma", "#include \"a\"\n");
        fx.assert_consistent();
        let two = fx.open("two.sma", "#include \"b\"\n#include \"c\"\n");
        fx.assert_consistent();
        fx.edit(&one, "#include \"b\"\n");
        fx.assert_consistent();
        fx.workspace.close(&two);
        fx.assert_consistent();
        fx.edit(&one, "#include \"missing\"\n");
        fx.assert_consistent();
        assert!(fx.workspace.graph().is_empty());
        fx.workspace.close(&one);
        assert_eq!(fx.workspace.store().dependency_count(), 0);
    }
}
