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

//! Reference-counted graph of include targets.
//!
//! Every resolved include target is a [`DependencyNode`]. A node records the
//! set of documents that currently list it as a dependency; its reference
//! count is the size of that set. Recording owners instead of a bare counter
//! makes references idempotent per owning document: a file that includes
//! the same header twice holds one reference.
//!
//! Nodes are never removed when their count drops. Removal happens only in
//! [`DependencyGraph::prune_unreachable`], which runs after every reparse
//! and close.

use std::collections::{HashMap, HashSet, VecDeque};

use tower_lsp::lsp_types::Url;
use tracing::debug;

use crate::document_store::DocumentStore;

/// One include target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    uri: Url,
    referrers: HashSet<Url>,
}

impl DependencyNode {
    fn new(uri: Url) -> Self {
        Self {
            uri,
            referrers: HashSet::new(),
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Number of documents holding a reference to this node.
    pub fn ref_count(&self) -> usize {
        self.referrers.len()
    }

    /// Documents holding a reference to this node.
    pub fn referrers(&self) -> impl Iterator<Item = &Url> {
        self.referrers.iter()
    }

    pub fn is_referenced_by(&self, owner: &Url) -> bool {
        self.referrers.contains(owner)
    }
}

/// Graph of include targets keyed by resolved URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: HashMap<Url, DependencyNode>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uri: &Url) -> Option<&DependencyNode> {
        self.nodes.get(uri)
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.nodes.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.values()
    }

    /// Reference count of `uri`, or 0 if there is no such node.
    pub fn ref_count(&self, uri: &Url) -> usize {
        self.nodes.get(uri).map_or(0, DependencyNode::ref_count)
    }

    /// Records that `owner` depends on `target`, creating the node if needed.
    ///
    /// Returns `true` if this is a new reference from `owner`.
    pub fn add_reference(&mut self, owner: &Url, target: &Url) -> bool {
        self.nodes
            .entry(target.clone())
            .or_insert_with(|| DependencyNode::new(target.clone()))
            .referrers
            .insert(owner.clone())
    }

    /// Drops the references `owner` holds on `targets`.
    pub fn release_references<'a>(
        &mut self,
        owner: &Url,
        targets: impl IntoIterator<Item = &'a Url>,
    ) {
        for target in targets {
            if let Some(node) = self.nodes.get_mut(target) {
                node.referrers.remove(owner);
            }
        }
    }

    /// Removes every node no open document can reach.
    ///
    /// Reachability follows `dependencies` from every open document, then
    /// from the cached dependency entries of the files reached. A reference
    /// survives only if the owner's open entry lists the target, or the owner
    /// is reached and its cached entry lists it, so a cycle of include files
    /// that no open document reaches cannot keep itself alive. Nodes
    /// left unreached with no references are removed together with their
    /// cached dependency entry, as are cached entries nothing reaches.
    ///
    /// Returns the removed URIs, sorted.
    pub fn prune_unreachable(&mut self, store: &mut DocumentStore) -> Vec<Url> {
        let mut reached: HashSet<Url> = HashSet::new();
        let mut queue: VecDeque<Url> = VecDeque::new();

        for doc in store.open_documents() {
            for dep in &doc.data.dependencies {
                if reached.insert(dep.clone()) {
                    queue.push_back(dep.clone());
                }
            }
        }
        while let Some(uri) = queue.pop_front() {
            if let Some(data) = store.dependency(&uri) {
                for dep in &data.dependencies {
                    if reached.insert(dep.clone()) {
                        queue.push_back(dep.clone());
                    }
                }
            }
        }

        for DependencyNode { uri, referrers } in self.nodes.values_mut() {
            referrers.retain(|owner| {
                let open_lists = store
                    .get_open(owner)
                    .is_some_and(|doc| doc.data.dependencies.contains(uri));
                let cached_lists = reached.contains(owner)
                    && store
                        .dependency(owner)
                        .is_some_and(|data| data.dependencies.contains(uri));
                open_lists || cached_lists
            });
        }

        let mut removed: Vec<Url> = self
            .nodes
            .iter()
            .filter(|(uri, node)| node.ref_count() == 0 && !reached.contains(*uri))
            .map(|(uri, _)| uri.clone())
            .chain(store.dependency_uris().filter(|uri| !reached.contains(*uri)).cloned())
            .collect();
        removed.sort();
        removed.dedup();

        for uri in &removed {
            self.nodes.remove(uri);
            store.remove_dependency(uri);
        }
        if !removed.is_empty() {
            debug!("Pruned {} unreachable dependencies", removed.len());
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::DocumentData;

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///ws/{}", name)).unwrap()
    }

    fn dependency(store: &mut DocumentStore, name: &str, deps: &[&str]) {
        let mut data = DocumentData::new(uri(name));
        data.dependencies = deps.iter().map(|d| uri(d)).collect();
        store.insert_dependency(data);
    }

    fn open(store: &mut DocumentStore, name: &str, deps: &[&str]) {
        let u = uri(name);
        store.set_text(&u, "", 1);
        let mut data = DocumentData::new(u);
        data.dependencies = deps.iter().map(|d| uri(d)).collect();
        store.set_open_data(data);
    }

    #[test]
    fn test_add_reference_is_idempotent_per_owner() {
        let mut graph = DependencyGraph::new();
        let (a, b, shared) = (uri("a.sma"), uri("b.sma"), uri("shared.inc"));
        assert!(graph.add_reference(&a, &shared));
        assert!(!graph.add_reference(&a, &shared));
        assert_eq!(graph.ref_count(&shared), 1);
        assert!(graph.add_reference(&b, &shared));
        assert_eq!(graph.ref_count(&shared), 2);
    }

    #[test]
    fn test_release_keeps_node_until_prune() {
        let mut graph = DependencyGraph::new();
        let mut store = DocumentStore::new();
        let (a, x) = (uri("a.sma"), uri("x.inc"));
        open(&mut store, "a.sma", &[]);
        dependency(&mut store, "x.inc", &[]);

        graph.add_reference(&a, &x);
        graph.release_references(&a, [&x]);
        assert!(graph.contains(&x));
        assert_eq!(graph.ref_count(&x), 0);

        assert_eq!(graph.prune_unreachable(&mut store), vec![x.clone()]);
        assert!(!graph.contains(&x));
        assert!(!store.has_dependency(&x));
    }

    #[test]
    fn test_transitive_dependencies_survive() {
        let mut graph = DependencyGraph::new();
        let mut store = DocumentStore::new();
        let (a, b, c) = (uri("a.sma"), uri("b.inc"), uri("c.inc"));
        open(&mut store, "a.sma", &["b.inc"]);
        dependency(&mut store, "b.inc", &["c.inc"]);
        dependency(&mut store, "c.inc", &[]);
        graph.add_reference(&a, &b);
        graph.add_reference(&b, &c);

        assert!(graph.prune_unreachable(&mut store).is_empty());
        assert_eq!(graph.ref_count(&c), 1);
        assert!(store.has_dependency(&c));
    }

    #[test]
    fn test_unreachable_cycle_is_removed() {
        let mut graph = DependencyGraph::new();
        let mut store = DocumentStore::new();
        let (b, c) = (uri("b.inc"), uri("c.inc"));
        dependency(&mut store, "b.inc", &["c.inc"]);
        dependency(&mut store, "c.inc", &["b.inc"]);
        graph.add_reference(&b, &c);
        graph.add_reference(&c, &b);

        let removed = graph.prune_unreachable(&mut store);
        assert_eq!(removed, vec![b, c]);
        assert!(graph.is_empty());
        assert_eq!(store.dependency_count(), 0);
    }

    #[test]
    fn test_closed_owner_releases_on_prune() {
        let mut graph = DependencyGraph::new();
        let mut store = DocumentStore::new();
        let (a, b, shared) = (uri("a.sma"), uri("b.sma"), uri("shared.inc"));
        open(&mut store, "a.sma", &["shared.inc"]);
        open(&mut store, "b.sma", &["shared.inc"]);
        dependency(&mut store, "shared.inc", &[]);
        graph.add_reference(&a, &shared);
        graph.add_reference(&b, &shared);

        store.close(&a);
        assert!(graph.prune_unreachable(&mut store).is_empty());
        assert_eq!(graph.ref_count(&shared), 1);
        assert!(graph.get(&shared).unwrap().is_referenced_by(&b));

        store.close(&b);
        assert_eq!(graph.prune_unreachable(&mut store), vec![shared]);
    }

    #[test]
    fn test_unreached_cached_entry_of_open_file_releases() {
        let mut graph = DependencyGraph::new();
        let mut store = DocumentStore::new();
        let (x, y) = (uri("x.inc"), uri("y.inc"));
        // x is open with its include removed, but its stale disk entry
        // still lists y.
        open(&mut store, "x.inc", &[]);
        dependency(&mut store, "x.inc", &["y.inc"]);
        dependency(&mut store, "y.inc", &[]);
        graph.add_reference(&x, &y);

        let removed = graph.prune_unreachable(&mut store);
        assert_eq!(removed, vec![x.clone(), y]);
        assert!(graph.is_empty());
        assert_eq!(store.dependency_count(), 0);
        assert!(store.is_open(&x));
    }
}
