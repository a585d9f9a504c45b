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

//! Document symbols for the outline view.
//!
//! Only the document's own callables are listed; symbols from included
//! files never appear in another file's outline.

use tower_lsp::lsp_types::*;
use tracing::debug;

use crate::utils::to_range;
use crate::workspace::Workspace;

/// Get document symbols for outline view.
///
/// Each callable is reported over its declaration header, with the name as
/// the selection range and the declaration label as detail.
#[allow(deprecated)]
pub fn get_document_symbols(workspace: &Workspace, uri: &Url) -> Option<Vec<DocumentSymbol>> {
    let doc = workspace.document(uri)?;
    let symbols: Vec<DocumentSymbol> = doc
        .data
        .callables
        .iter()
        .map(|callable| DocumentSymbol {
            name: callable.name.clone(),
            detail: Some(callable.label.clone()),
            kind: SymbolKind::FUNCTION,
            tags: None,
            deprecated: None,
            range: to_range(callable.range),
            selection_range: to_range(callable.name_span),
            children: None,
        })
        .collect();
    debug!("Extracted {} document symbols from {}", symbols.len(), uri);
    Some(symbols)
}
