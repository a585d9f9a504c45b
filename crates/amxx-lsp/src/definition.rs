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

//! Go to definition.

use tower_lsp::lsp_types::*;

use crate::aggregate::AggregatedSymbols;
use crate::document_store::{DocumentData, ResolvedInclusion};
use crate::utils::{to_range, word_at};
use crate::workspace::Workspace;

/// Finds the definition of the symbol or include under `position`.
///
/// Inside an include directive's file name this is the head of the included
/// file. On the name of a declaration in the document itself it is that
/// declaration. Otherwise the identifier under the cursor is looked up in
/// the aggregated symbol view, callables before values, so a value can be
/// hidden by a callable of the same name.
pub fn get_definition(workspace: &Workspace, uri: &Url, position: Position) -> Option<Location> {
    let doc = workspace.document(uri)?;

    if let Some(inclusion) = inclusion_at(&doc.data.resolved_inclusions, position) {
        return Some(Location {
            uri: inclusion.uri.clone(),
            range: Range::new(Position::new(0, 0), Position::new(0, 1)),
        });
    }

    let line = doc.line(position.line)?;
    let (word, start, end) = word_at(&line, position.character)?;
    let word_range = Range::new(
        Position::new(position.line, start),
        Position::new(position.line, end),
    );
    if let Some(range) = declaration_at(&doc.data, word_range) {
        return Some(Location {
            uri: uri.clone(),
            range,
        });
    }

    let symbols = AggregatedSymbols::collect(workspace.store(), uri);

    if let Some(callable) = symbols.callable(&word) {
        return Some(Location {
            uri: callable.uri.clone(),
            range: to_range(callable.symbol.name_span),
        });
    }
    symbols.value(&word).map(|value| Location {
        uri: value.uri.clone(),
        range: to_range(value.symbol.name_span),
    })
}

/// The name range of a declaration in `data` spanning exactly `word`.
fn declaration_at(data: &DocumentData, word: Range) -> Option<Range> {
    data.callables
        .iter()
        .map(|c| to_range(c.name_span))
        .chain(data.values.iter().map(|v| to_range(v.name_span)))
        .find(|range| *range == word)
}

/// The resolved inclusion whose file name strictly surrounds `position`.
pub(crate) fn inclusion_at(
    inclusions: &[ResolvedInclusion],
    position: Position,
) -> Option<&ResolvedInclusion> {
    inclusions.iter().find(|inc| {
        inc.range.start.line == position.line
            && inc.range.start.character < position.character
            && position.character < inc.range.end.character
    })
}
