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

//! The aggregated symbol view of a document.
//!
//! A document sees its own symbols plus those of every file reachable
//! through its resolved inclusions. Files are visited breadth-first, so a
//! file included directly takes precedence over one included through
//! another header; among files at the same distance the first included
//! wins. The first symbol seen for a name hides every later one.

use std::collections::{HashSet, VecDeque};

use amxx_parser::{Callable, Value};
use tower_lsp::lsp_types::Url;

use crate::document_store::DocumentStore;

/// A symbol together with the file that declares it.
#[derive(Debug)]
pub struct Located<'a, T> {
    pub uri: &'a Url,
    pub symbol: &'a T,
}

impl<T> Clone for Located<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Located<'_, T> {}

/// Callables and values visible from one document, in precedence order.
#[derive(Debug, Default)]
pub struct AggregatedSymbols<'a> {
    pub callables: Vec<Located<'a, Callable>>,
    pub values: Vec<Located<'a, Value>>,
}

impl<'a> AggregatedSymbols<'a> {
    /// Collects the symbols visible from `uri`.
    ///
    /// Returns an empty view if the store knows nothing about `uri`.
    pub fn collect(store: &'a DocumentStore, uri: &Url) -> Self {
        let mut view = Self::default();
        let Some(own) = store.data(uri) else {
            return view;
        };

        let mut callable_names: HashSet<&str> = HashSet::new();
        let mut value_names: HashSet<&str> = HashSet::new();
        let mut visited: HashSet<&Url> = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(&own.uri);
        queue.push_back(own);

        while let Some(data) = queue.pop_front() {
            for callable in &data.callables {
                if callable_names.insert(&callable.name) {
                    view.callables.push(Located {
                        uri: &data.uri,
                        symbol: callable,
                    });
                }
            }
            for value in &data.values {
                if value_names.insert(&value.name) {
                    view.values.push(Located {
                        uri: &data.uri,
                        symbol: value,
                    });
                }
            }
            for inclusion in &data.resolved_inclusions {
                if !visited.insert(&inclusion.uri) {
                    continue;
                }
                if let Some(included) = store.included(&inclusion.uri) {
                    queue.push_back(included);
                }
            }
        }
        view
    }

    pub fn callable(&self, name: &str) -> Option<Located<'a, Callable>> {
        self.callables
            .iter()
            .find(|c| c.symbol.name == name)
            .copied()
    }

    pub fn value(&self, name: &str) -> Option<Located<'a, Value>> {
        self.values.iter().find(|v| v.symbol.name == name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.callables.is_empty() && self.values.is_empty()
    }
}
