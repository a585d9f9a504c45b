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

//! Signature help.
//!
//! The text before the cursor (the current line and a few lines above it)
//! is scanned for the innermost call that is still open. The callable it
//! names is looked up in the aggregated symbol view, and commas at the
//! call's own nesting level select the active parameter.

use amxx_parser::{lex::is_keyword, Callable};
use tower_lsp::lsp_types::*;

use crate::aggregate::AggregatedSymbols;
use crate::constants::SIGNATURE_LOOKBACK_LINES;
use crate::utils::{byte_offset, is_word_char};
use crate::workspace::Workspace;

/// An unclosed call before the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CallContext {
    pub name: String,
    /// Zero-based index of the argument being typed.
    pub argument: u32,
}

enum Frame {
    Call { name: Option<String>, commas: u32 },
    Group,
}

/// Get signature help for a position.
pub fn get_signature_help(
    workspace: &Workspace,
    uri: &Url,
    position: Position,
) -> Option<SignatureHelp> {
    let doc = workspace.document(uri)?;

    let mut text = String::new();
    for line in position.line.saturating_sub(SIGNATURE_LOOKBACK_LINES)..position.line {
        text.push_str(&doc.line(line).unwrap_or_default());
        text.push('\n');
    }
    let current = doc.line(position.line)?;
    text.push_str(&current[..byte_offset(&current, position.character)]);

    let call = call_context(&text)?;
    let symbols = AggregatedSymbols::collect(workspace.store(), uri);
    let callable = symbols.callable(&call.name)?.symbol;

    Some(SignatureHelp {
        signatures: vec![signature_information(callable)],
        active_signature: Some(0),
        active_parameter: active_parameter(callable, call.argument),
    })
}

fn signature_information(callable: &Callable) -> SignatureInformation {
    let label = &callable.label;
    let mut search_from = label.find('(').map(|i| i + 1).unwrap_or(0);
    let parameters = callable
        .parameters
        .iter()
        .map(|param| {
            let label = match label[search_from..].find(&param.label) {
                Some(found) => {
                    let start = search_from + found;
                    search_from = start + param.label.len();
                    ParameterLabel::LabelOffsets([
                        utf16_len(&label[..start]),
                        utf16_len(&label[..search_from]),
                    ])
                }
                None => ParameterLabel::Simple(param.label.clone()),
            };
            ParameterInformation {
                label,
                documentation: None,
            }
        })
        .collect();

    SignatureInformation {
        label: callable.label.clone(),
        documentation: callable.documentation.as_ref().map(|doc| {
            Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: doc.clone(),
            })
        }),
        parameters: Some(parameters),
        active_parameter: None,
    }
}

/// The argument index, clamped onto a trailing `...` parameter.
fn active_parameter(callable: &Callable, argument: u32) -> Option<u32> {
    let count = callable.parameters.len() as u32;
    if argument < count {
        return Some(argument);
    }
    match callable.parameters.last() {
        Some(last) if last.label.ends_with("...") => Some(count - 1),
        _ => None,
    }
}

fn utf16_len(text: &str) -> u32 {
    text.chars().map(|c| c.len_utf16() as u32).sum()
}

/// Finds the innermost open call in `text`, which ends at the cursor.
///
/// String and character literals and comments are skipped. Parentheses not
/// preceded by a name, and those following a keyword (`if (`, `sizeof(`),
/// are groups rather than calls; the search continues outward past them.
pub(crate) fn call_context(text: &str) -> Option<CallContext> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut word = String::new();
    let mut last_word: Option<String> = None;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if is_word_char(ch) {
            word.push(ch);
            continue;
        }
        if !word.is_empty() {
            last_word = Some(std::mem::take(&mut word));
        }

        match ch {
            '"' | '\'' => {
                while let Some(c) = chars.next() {
                    if c == '^' {
                        chars.next();
                    } else if c == ch || c == '\n' {
                        break;
                    }
                }
                last_word = None;
            }
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '(' => stack.push(Frame::Call {
                name: last_word.take(),
                commas: 0,
            }),
            '[' | '{' => {
                stack.push(Frame::Group);
                last_word = None;
            }
            ')' | ']' | '}' => {
                stack.pop();
                last_word = None;
            }
            ',' => {
                if let Some(Frame::Call { commas, .. }) = stack.last_mut() {
                    *commas += 1;
                }
                last_word = None;
            }
            c if c.is_whitespace() => {}
            _ => last_word = None,
        }
    }

    stack.iter().rev().find_map(|frame| match frame {
        Frame::Call {
            name: Some(name),
            commas,
        } if !is_keyword(name) && !name.starts_with(|c: char| c.is_ascii_digit()) => {
            Some(CallContext {
                name: name.clone(),
                argument: *commas,
            })
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::Fixture;

    fn context(text: &str) -> Option<(String, u32)> {
        call_context(text).map(|c| (c.name, c.argument))
    }

    #[test]
    fn test_call_context_basic() {
        assert_eq!(context("    set_user_health("), Some(("set_user_health".into(), 0)));
        assert_eq!(context("set_user_health(id, "), Some(("set_user_health".into(), 1)));
        assert_eq!(context("set_user_health (id"), Some(("set_user_health".into(), 0)));
    }

    #[test]
    fn test_call_context_nested() {
        assert_eq!(context("foo(a, bar(b, c), "), Some(("foo".into(), 2)));
        assert_eq!(context("foo(a, bar(b, "), Some(("bar".into(), 1)));
        assert_eq!(context("foo(a, (b + c, "), Some(("foo".into(), 1)));
        assert_eq!(context("foo(arr[1, 2], "), Some(("foo".into(), 1)));
        assert_eq!(context("foo(a, {1, 2}, "), Some(("foo".into(), 2)));
    }

    #[test]
    fn test_call_context_skips_literals_and_comments() {
        assert_eq!(
            context("client_print(id, print_chat, \"a, (b\", "),
            Some(("client_print".into(), 3))
        );
        assert_eq!(context("f(\"say ^\"hi, there^\"\", "), Some(("f".into(), 1)));
        assert_eq!(context("f(',', "), Some(("f".into(), 1)));
        assert_eq!(context("f(a, // g(\n"), Some(("f".into(), 1)));
        assert_eq!(context("f(a, /* g( */ "), Some(("f".into(), 1)));
    }

    #[test]
    fn test_call_context_none() {
        assert_eq!(context("foo(a)"), None);
        assert_eq!(context("if (x == "), None);
        assert_eq!(context("new x = "), None);
        assert_eq!(context("if (is_user_alive("), Some(("is_user_alive".into(), 0)));
    }

    #[test]
    fn test_signature_help_in_document() {
        let mut fx = Fixture::new();
        fx.write(
            "util.inc",
            "// Adds numbers.\nstock add(a, Float:b, ...) { return a; }\n",
        );
        let main = fx.open(
            "main.sma",
            "#include \"util\"\npublic f() {\n    add(1, 2.0, 3, 4\n}\n",
        );

        let help = get_signature_help(&fx.workspace, &main, Position::new(2, 11)).unwrap();
        assert_eq!(help.active_parameter, Some(1));
        let sig = &help.signatures[0];
        assert_eq!(sig.label, "stock add(a, Float:b, ...)");
        let params = sig.parameters.as_ref().unwrap();
        assert_eq!(params[0].label, ParameterLabel::LabelOffsets([10, 11]));
        assert_eq!(params[1].label, ParameterLabel::LabelOffsets([13, 20]));
        assert_eq!(params[2].label, ParameterLabel::LabelOffsets([22, 25]));

        // Extra arguments land on the variadic parameter.
        let help = get_signature_help(&fx.workspace, &main, Position::new(2, 19)).unwrap();
        assert_eq!(help.active_parameter, Some(2));
    }

    #[test]
    fn test_signature_help_spans_lines() {
        let mut fx = Fixture::new();
        let main = fx.open(
            "main.sma",
            "stock g(a, b) {}\npublic f() {\n    g(1,\n      \n}\n",
        );
        let help = get_signature_help(&fx.workspace, &main, Position::new(3, 6)).unwrap();
        assert_eq!(help.active_parameter, Some(1));
    }

    #[test]
    fn test_signature_help_unknown_callable() {
        let mut fx = Fixture::new();
        let main = fx.open("main.sma", "public f() {\n    nothing(\n}\n");
        assert!(get_signature_help(&fx.workspace, &main, Position::new(1, 12)).is_none());
    }
}
