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

//! Autocompletion.
//!
//! # Completion Contexts
//!
//! - **Directive name**: the cursor follows a `#` at the start of a line;
//!   preprocessor directives are suggested.
//! - **Directive argument**: anywhere else on a directive line; nothing is
//!   suggested.
//! - **Code**: everything visible from the document (own symbols first,
//!   then included files by distance) followed by the language keywords.
//!
//! The client filters by the typed prefix, so every candidate of the
//! context is returned.

use amxx_parser::lex::DIRECTIVES;
use amxx_parser::{Callable, Value, ValueKind, KEYWORDS};
use tower_lsp::lsp_types::*;

use crate::aggregate::AggregatedSymbols;
use crate::utils::{byte_offset, is_word_char};
use crate::workspace::Workspace;

/// Syntactic context of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionContext {
    DirectiveName,
    DirectiveArgument,
    Code,
}

/// Determines the completion context from the text before the cursor.
pub fn determine_context(line_prefix: &str) -> CompletionContext {
    let Some(directive) = line_prefix.trim_start().strip_prefix('#') else {
        return CompletionContext::Code;
    };
    if directive.trim_start().chars().all(is_word_char) {
        CompletionContext::DirectiveName
    } else {
        CompletionContext::DirectiveArgument
    }
}

/// Get completions for a position in the document.
pub fn get_completions(
    workspace: &Workspace,
    uri: &Url,
    position: Position,
) -> Option<Vec<CompletionItem>> {
    let doc = workspace.document(uri)?;
    let line = doc.line(position.line)?;
    let prefix = &line[..byte_offset(&line, position.character)];

    let items = match determine_context(prefix) {
        CompletionContext::DirectiveName => directive_completions(),
        CompletionContext::DirectiveArgument => Vec::new(),
        CompletionContext::Code => {
            let symbols = AggregatedSymbols::collect(workspace.store(), uri);
            let mut items: Vec<CompletionItem> = symbols
                .callables
                .iter()
                .map(|c| callable_item(c.symbol))
                .collect();
            items.extend(symbols.values.iter().map(|v| value_item(v.symbol)));
            items.extend(keyword_completions());
            items
        }
    };
    Some(items)
}

fn callable_item(callable: &Callable) -> CompletionItem {
    CompletionItem {
        label: callable.name.clone(),
        kind: Some(CompletionItemKind::FUNCTION),
        detail: Some(callable.label.clone()),
        documentation: documentation(&callable.documentation),
        ..Default::default()
    }
}

fn value_item(value: &Value) -> CompletionItem {
    let kind = match value.kind {
        ValueKind::Variable => CompletionItemKind::VARIABLE,
        ValueKind::Constant | ValueKind::Define => CompletionItemKind::CONSTANT,
        ValueKind::Enum => CompletionItemKind::ENUM,
        ValueKind::EnumMember => CompletionItemKind::ENUM_MEMBER,
    };
    CompletionItem {
        label: value.name.clone(),
        kind: Some(kind),
        detail: Some(value.label.clone()),
        documentation: documentation(&value.documentation),
        ..Default::default()
    }
}

fn documentation(doc: &Option<String>) -> Option<Documentation> {
    doc.as_ref().map(|value| {
        Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::Markdown,
            value: value.clone(),
        })
    })
}

fn directive_completions() -> Vec<CompletionItem> {
    DIRECTIVES
        .iter()
        .map(|name| CompletionItem {
            label: name.to_string(),
            kind: Some(CompletionItemKind::KEYWORD),
            detail: Some(format!("#{}", name)),
            ..Default::default()
        })
        .collect()
}

fn keyword_completions() -> Vec<CompletionItem> {
    KEYWORDS
        .iter()
        .map(|kw| CompletionItem {
            label: kw.to_string(),
            kind: Some(CompletionItemKind::KEYWORD),
            ..Default::default()
        })
        .collect()
}
