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

//! Preprocessor directive classification.
//!
//! Only the directives that contribute symbols or dependencies are looked at
//! in detail (`#include`, `#tryinclude`, `#define`). Conditional compilation
//! is tracked just enough to avoid reporting redefinitions inside `#if`
//! branches; the branches themselves are not evaluated.

use crate::error::SyntaxError;
use crate::lex::{Token, DIRECTIVES};
use crate::span::Span;
use crate::symbols::IncludeDirective;

/// A `#define` found on a directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MacroDefinition {
    pub name: String,
    pub name_span: Span,
    pub label: String,
}

/// What a directive line means to the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive {
    Include(IncludeDirective),
    Define(MacroDefinition),
    /// `#if`
    OpenConditional,
    /// `#endif`
    CloseConditional,
    /// Any other directive the scanner knows and ignores.
    Other,
    Unknown(String),
    Malformed(SyntaxError, Span),
}

/// Classifies a [`crate::lex::TokenKind::Directive`] token.
pub(crate) fn classify(token: &Token<'_>) -> Directive {
    let text = token.text;
    let span_of = |from: usize, to: usize| {
        Span::new(
            token.span.start.advanced_by(&text[..from]),
            token.span.start.advanced_by(&text[..to]),
        )
    };

    let after_hash = &text[1..];
    let name_start = 1 + (after_hash.len() - after_hash.trim_start().len());
    let name_len = text[name_start..]
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(text.len() - name_start);
    let name_end = name_start + name_len;
    let name = &text[name_start..name_end];

    let rest = &text[name_end..];
    let arg_start = name_end + (rest.len() - rest.trim_start().len());
    let arg = &text[arg_start..];

    match name {
        "include" | "tryinclude" => {
            let is_silent = name == "tryinclude";
            let (filename, is_local, end) = match arg.chars().next() {
                None => {
                    return Directive::Malformed(
                        SyntaxError::malformed(name, "missing file name"),
                        token.span,
                    )
                }
                Some(open @ ('<' | '"')) => {
                    let close = if open == '<' { '>' } else { '"' };
                    match arg[1..].find(close) {
                        Some(i) => (arg[1..1 + i].trim(), open == '"', arg_start + i + 2),
                        None => {
                            let reason = if open == '<' {
                                "missing closing '>'"
                            } else {
                                "missing closing '\"'"
                            };
                            return Directive::Malformed(
                                SyntaxError::malformed(name, reason),
                                span_of(arg_start, text.len()),
                            );
                        }
                    }
                }
                Some(_) => {
                    let len = arg.find(char::is_whitespace).unwrap_or(arg.len());
                    (&arg[..len], false, arg_start + len)
                }
            };
            if filename.is_empty() {
                return Directive::Malformed(
                    SyntaxError::malformed(name, "missing file name"),
                    span_of(arg_start, end),
                );
            }
            Directive::Include(IncludeDirective {
                filename: filename.to_string(),
                is_local,
                is_silent,
                span: span_of(arg_start, end),
            })
        }
        "define" => {
            let ident_len = arg
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '@'))
                .unwrap_or(arg.len());
            if ident_len == 0 {
                return Directive::Malformed(
                    SyntaxError::malformed(name, "missing macro name"),
                    token.span,
                );
            }
            let label = std::iter::once("#define")
                .chain(arg.split_whitespace().filter(|w| *w != "\\"))
                .collect::<Vec<_>>()
                .join(" ");
            Directive::Define(MacroDefinition {
                name: arg[..ident_len].to_string(),
                name_span: span_of(arg_start, arg_start + ident_len),
                label,
            })
        }
        "if" => Directive::OpenConditional,
        "endif" => Directive::CloseConditional,
        known if DIRECTIVES.contains(&known) => Directive::Other,
        // A lone `#` is harmless.
        "" => Directive::Other,
        unknown => Directive::Unknown(unknown.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::tokenize;
    use crate::span::SourcePos;

    fn classify_str(src: &str) -> Directive {
        let out = tokenize(src);
        classify(&out.tokens[0])
    }

    #[test]
    fn test_system_include() {
        match classify_str("#include <amxmodx>") {
            Directive::Include(inc) => {
                assert_eq!(inc.filename, "amxmodx");
                assert!(!inc.is_local);
                assert!(!inc.is_silent);
                assert_eq!(inc.span.start, SourcePos::new(0, 9));
                assert_eq!(inc.span.end, SourcePos::new(0, 18));
            }
            other => panic!("expected include, got {:?}", other),
        }
    }

    #[test]
    fn test_local_include() {
        match classify_str("#include \"util.inc\"") {
            Directive::Include(inc) => {
                assert_eq!(inc.filename, "util.inc");
                assert!(inc.is_local);
                assert_eq!(inc.span.start.character, 9);
                assert_eq!(inc.span.end.character, 19);
            }
            other => panic!("expected include, got {:?}", other),
        }
    }

    #[test]
    fn test_tryinclude_is_silent() {
        match classify_str("#tryinclude <optional>") {
            Directive::Include(inc) => assert!(inc.is_silent),
            other => panic!("expected include, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_include_and_no_space() {
        match classify_str("#include fakemeta") {
            Directive::Include(inc) => {
                assert_eq!(inc.filename, "fakemeta");
                assert!(!inc.is_local);
            }
            other => panic!("expected include, got {:?}", other),
        }
        match classify_str("#include<cstrike>") {
            Directive::Include(inc) => assert_eq!(inc.filename, "cstrike"),
            other => panic!("expected include, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_include() {
        assert!(matches!(
            classify_str("#include"),
            Directive::Malformed(SyntaxError::MalformedDirective { .. }, _)
        ));
        assert!(matches!(
            classify_str("#include <amxmodx"),
            Directive::Malformed(SyntaxError::MalformedDirective { reason: "missing closing '>'", .. }, _)
        ));
        assert!(matches!(
            classify_str("#include <>"),
            Directive::Malformed(SyntaxError::MalformedDirective { reason: "missing file name", .. }, _)
        ));
    }

    #[test]
    fn test_define() {
        match classify_str("#define MAX_PLAYERS 32") {
            Directive::Define(def) => {
                assert_eq!(def.name, "MAX_PLAYERS");
                assert_eq!(def.label, "#define MAX_PLAYERS 32");
                assert_eq!(def.name_span.start.character, 8);
                assert_eq!(def.name_span.end.character, 19);
            }
            other => panic!("expected define, got {:?}", other),
        }
    }

    #[test]
    fn test_define_macro_with_arguments() {
        match classify_str("#define IsPlayer(%1) (1 <= %1 <= 32)") {
            Directive::Define(def) => assert_eq!(def.name, "IsPlayer"),
            other => panic!("expected define, got {:?}", other),
        }
    }

    #[test]
    fn test_conditionals_and_known() {
        assert_eq!(classify_str("#if defined _x_included"), Directive::OpenConditional);
        assert_eq!(classify_str("#endif"), Directive::CloseConditional);
        assert_eq!(classify_str("#pragma semicolon 1"), Directive::Other);
        assert_eq!(classify_str("#endinput"), Directive::Other);
    }

    #[test]
    fn test_unknown_directive() {
        assert_eq!(classify_str("#frobnicate"), Directive::Unknown("frobnicate".into()));
    }
}
