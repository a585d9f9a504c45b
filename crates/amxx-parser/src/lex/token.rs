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

//! Token types produced by the lexer.

use crate::span::Span;

/// Pawn keywords that can never name a declaration.
pub const KEYWORDS: &[&str] = &[
    "assert", "break", "case", "char", "const", "continue", "default", "defined", "do", "else",
    "enum", "exit", "for", "forward", "goto", "if", "native", "new", "operator", "public",
    "return", "sizeof", "sleep", "state", "static", "stock", "switch", "tagof", "while",
];

/// Preprocessor directives the scanner understands.
pub const DIRECTIVES: &[&str] = &[
    "assert", "define", "elseif", "else", "emit", "endif", "endinput", "endscript", "error",
    "file", "if", "include", "line", "pragma", "section", "tryinclude", "undef",
];

/// Returns `true` if `word` is a reserved Pawn keyword.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword (`@` is allowed, e.g. `@task_think`).
    Ident,
    /// Numeric literal.
    Number,
    /// `"..."` literal.
    String,
    /// `'c'` literal.
    Char,
    /// Single punctuation character.
    Punct,
    /// A whole preprocessor line, starting at `#`.
    Directive,
}

/// A token with its source text and location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset just past the last character.
    pub end: usize,
    /// `true` if this is the first token on its line.
    pub line_start: bool,
}

impl<'a> Token<'a> {
    /// Returns `true` if this is the punctuation character `ch`.
    #[inline]
    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punct && self.text.starts_with(ch)
    }

    /// Returns `true` if this is the identifier or keyword `word`.
    #[inline]
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }

    /// Human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Ident if is_keyword(self.text) => format!("keyword '{}'", self.text),
            TokenKind::Ident => format!("identifier '{}'", self.text),
            TokenKind::Number => format!("number '{}'", self.text),
            TokenKind::String => "string literal".to_string(),
            TokenKind::Char => "character literal".to_string(),
            TokenKind::Punct => format!("'{}'", self.text),
            TokenKind::Directive => "preprocessor directive".to_string(),
        }
    }
}

/// A source comment, kept for documentation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment<'a> {
    /// Raw text including the comment markers.
    pub text: &'a str,
    pub span: Span,
    /// `true` for `/* */` comments.
    pub is_block: bool,
}

impl Comment<'_> {
    /// Comment text with markers and decorative leading `*` removed.
    pub fn content(&self) -> String {
        if self.is_block {
            let inner = self
                .text
                .trim_start_matches("/*")
                .trim_start_matches('*')
                .trim_end_matches("*/");
            inner
                .lines()
                .map(|line| {
                    let line = line.trim();
                    line.strip_prefix('*').map(str::trim_start).unwrap_or(line)
                })
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        } else {
            self.text
                .trim_start_matches('/')
                .trim_start_matches('!')
                .trim()
                .to_string()
        }
    }
}
