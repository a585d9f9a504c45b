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

//! Hover information.
//!
//! Hovering an identifier shows its declaration as a Pawn code block,
//! followed by the documentation comment written above it, if any.

use tower_lsp::lsp_types::*;

use crate::aggregate::AggregatedSymbols;
use crate::utils::word_at;
use crate::workspace::Workspace;

/// Get hover information for a position.
///
/// Returns `None` if the document is not open or nothing visible from it is
/// named by the identifier under the cursor.
pub fn get_hover(workspace: &Workspace, uri: &Url, position: Position) -> Option<Hover> {
    let doc = workspace.document(uri)?;
    let line = doc.line(position.line)?;
    let (word, start, end) = word_at(&line, position.character)?;
    let symbols = AggregatedSymbols::collect(workspace.store(), uri);

    let (label, documentation) = match symbols.callable(&word) {
        Some(callable) => (&callable.symbol.label, &callable.symbol.documentation),
        None => {
            let value = symbols.value(&word)?;
            (&value.symbol.label, &value.symbol.documentation)
        }
    };

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: hover_markdown(label, documentation.as_deref()),
        }),
        range: Some(Range::new(
            Position::new(position.line, start),
            Position::new(position.line, end),
        )),
    })
}

pub(crate) fn hover_markdown(label: &str, documentation: Option<&str>) -> String {
    let mut value = format!("```pawn\n{}\n```", label);
    if let Some(doc) = documentation.filter(|d| !d.is_empty()) {
        value.push_str("\n\n");
        value.push_str(doc);
    }
    value
}
