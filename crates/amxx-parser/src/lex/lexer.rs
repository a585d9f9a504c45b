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

//! Single-pass Pawn tokenizer.
//!
//! The lexer never stops early. Problems are recorded as diagnostics and the
//! offending character is skipped, so the parser always gets a usable token
//! stream.

use super::token::{Comment, Token, TokenKind};
use crate::diagnostic::Diagnostic;
use crate::error::SyntaxError;
use crate::span::{SourcePos, Span};

/// Pawn's default control (escape) character.
const CTRL_CHAR: char = '^';

const PUNCTUATION: &str = "(){}[],;=:+-*/%&|^!~<>?.\\";

/// Output of [`tokenize`].
#[derive(Debug, Default)]
pub struct LexOutput<'a> {
    pub tokens: Vec<Token<'a>>,
    pub comments: Vec<Comment<'a>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Tokenizes `src`.
pub fn tokenize(src: &str) -> LexOutput<'_> {
    let mut lexer = Lexer::new(src);
    lexer.run();
    lexer.out
}

#[inline]
fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '@'
}

#[inline]
fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '@'
}

struct Lexer<'a> {
    src: &'a str,
    offset: usize,
    pos: SourcePos,
    /// Only whitespace seen since the last line break.
    at_line_start: bool,
    /// A line break was seen since the last token.
    newline_pending: bool,
    out: LexOutput<'a>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            offset: 0,
            pos: SourcePos::default(),
            at_line_start: true,
            newline_pending: true,
            out: LexOutput::default(),
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.src[self.offset..].chars().next()
    }

    #[inline]
    fn peek_second(&self) -> Option<char> {
        self.src[self.offset..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.character = 0;
        } else {
            self.pos.character += ch.len_utf16() as u32;
        }
        Some(ch)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, start_pos: SourcePos) {
        self.out.tokens.push(Token {
            kind,
            text: &self.src[start..self.offset],
            span: Span::new(start_pos, self.pos),
            start,
            end: self.offset,
            line_start: self.newline_pending,
        });
        self.newline_pending = false;
        self.at_line_start = false;
    }

    fn run(&mut self) {
        while let Some(ch) = self.peek() {
            let start = self.offset;
            let start_pos = self.pos;

            match ch {
                '\n' => {
                    self.bump();
                    self.at_line_start = true;
                    self.newline_pending = true;
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek_second() == Some('/') => self.line_comment(start, start_pos),
                '/' if self.peek_second() == Some('*') => self.block_comment(start, start_pos),
                '#' if self.at_line_start => self.directive(start, start_pos),
                '"' => self.literal('"', "string", TokenKind::String, start, start_pos),
                '\'' => self.literal('\'', "character", TokenKind::Char, start, start_pos),
                c if is_ident_start(c) => {
                    self.bump_while(is_ident_continue);
                    self.push(TokenKind::Ident, start, start_pos);
                }
                c if c.is_ascii_digit() => {
                    self.bump_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
                    self.push(TokenKind::Number, start, start_pos);
                }
                c if PUNCTUATION.contains(c) => {
                    self.bump();
                    self.push(TokenKind::Punct, start, start_pos);
                }
                c => {
                    self.bump();
                    self.out.diagnostics.push(Diagnostic::error(
                        SyntaxError::UnexpectedChar(c),
                        Span::new(start_pos, self.pos),
                    ));
                }
            }
        }
    }

    fn line_comment(&mut self, start: usize, start_pos: SourcePos) {
        self.bump_while(|c| c != '\n');
        self.out.comments.push(Comment {
            text: &self.src[start..self.offset],
            span: Span::new(start_pos, self.pos),
            is_block: false,
        });
    }

    fn block_comment(&mut self, start: usize, start_pos: SourcePos) {
        self.bump();
        self.bump();
        let mut closed = false;
        while let Some(ch) = self.bump() {
            if ch == '*' && self.peek() == Some('/') {
                self.bump();
                closed = true;
                break;
            }
        }
        if !closed {
            self.out.diagnostics.push(Diagnostic::error(
                SyntaxError::UnterminatedComment,
                Span::new(start_pos, start_pos.advanced_by("/*")),
            ));
        }
        self.out.comments.push(Comment {
            text: &self.src[start..self.offset],
            span: Span::new(start_pos, self.pos),
            is_block: true,
        });
    }

    /// Consumes a preprocessor line, honouring `\` continuations and stopping
    /// before a trailing comment.
    fn directive(&mut self, start: usize, start_pos: SourcePos) {
        let mut quote: Option<char> = None;
        loop {
            match self.peek() {
                None => break,
                Some('\n') => {
                    let before = self.src[start..self.offset].trim_end_matches('\r');
                    if before.ends_with('\\') {
                        self.bump();
                        continue;
                    }
                    break;
                }
                Some(c) if quote.is_some() => {
                    self.bump();
                    if c == CTRL_CHAR && self.peek().is_some_and(|n| n != '\n') {
                        self.bump();
                    } else if Some(c) == quote {
                        quote = None;
                    }
                }
                Some(c @ ('"' | '\'')) => {
                    quote = Some(c);
                    self.bump();
                }
                Some('/') if matches!(self.peek_second(), Some('/') | Some('*')) => break,
                Some(_) => {
                    self.bump();
                }
            }
        }
        let end = self.src[start..self.offset].trim_end().len() + start;
        let end_pos = start_pos.advanced_by(&self.src[start..end]);
        self.out.tokens.push(Token {
            kind: TokenKind::Directive,
            text: &self.src[start..end],
            span: Span::new(start_pos, end_pos),
            start,
            end,
            line_start: true,
        });
        self.newline_pending = false;
        self.at_line_start = false;
    }

    fn literal(
        &mut self,
        delimiter: char,
        what: &'static str,
        kind: TokenKind,
        start: usize,
        start_pos: SourcePos,
    ) {
        self.bump();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.out.diagnostics.push(Diagnostic::error(
                        SyntaxError::UnterminatedLiteral(what),
                        Span::new(start_pos, self.pos),
                    ));
                    break;
                }
                Some(c) if c == CTRL_CHAR => {
                    self.bump();
                    if self.peek().is_some_and(|n| n != '\n') {
                        self.bump();
                    }
                }
                Some(c) if c == delimiter => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        self.push(kind, start, start_pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, &str)> {
        tokenize(src)
            .tokens
            .iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_identifiers_and_punct() {
        assert_eq!(
            kinds("public plugin_init() {}"),
            vec![
                (TokenKind::Ident, "public"),
                (TokenKind::Ident, "plugin_init"),
                (TokenKind::Punct, "("),
                (TokenKind::Punct, ")"),
                (TokenKind::Punct, "{"),
                (TokenKind::Punct, "}"),
            ]
        );
    }

    #[test]
    fn test_at_sign_identifiers() {
        assert_eq!(kinds("@think"), vec![(TokenKind::Ident, "@think")]);
    }

    #[test]
    fn test_directive_is_single_token() {
        let out = tokenize("#include <amxmodx>\nnew x;");
        assert_eq!(out.tokens[0].kind, TokenKind::Directive);
        assert_eq!(out.tokens[0].text, "#include <amxmodx>");
        assert!(out.tokens[1].line_start);
    }

    #[test]
    fn test_directive_stops_before_comment() {
        let out = tokenize("#include <fun> // for set_user_health\n");
        assert_eq!(out.tokens[0].text, "#include <fun>");
        assert_eq!(out.comments.len(), 1);
    }

    #[test]
    fn test_directive_keeps_slashes_inside_strings() {
        let out = tokenize("#define URL \"http://example.com\"\n");
        assert_eq!(out.tokens[0].text, "#define URL \"http://example.com\"");
        assert!(out.comments.is_empty());
    }

    #[test]
    fn test_directive_continuation() {
        let out = tokenize("#define LONG 1 + \\\n  2\nnew x;");
        assert_eq!(out.tokens[0].text, "#define LONG 1 + \\\n  2");
        assert_eq!(out.tokens[1].text, "new");
        assert_eq!(out.tokens[1].span.start.line, 2);
    }

    #[test]
    fn test_hash_mid_line_is_not_directive() {
        let out = tokenize("new x # 1");
        assert!(out.tokens.iter().all(|t| t.kind != TokenKind::Directive));
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_string_with_ctrl_char_escape() {
        let out = tokenize(r#"new s[] = "say ^"hi^"^n";"#);
        assert!(out.diagnostics.is_empty());
        let string = out.tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(string.text, r#""say ^"hi^"^n""#);
    }

    #[test]
    fn test_unterminated_string() {
        let out = tokenize("new s[] = \"oops\nnew y;");
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(
            out.diagnostics[0].error_kind(),
            &SyntaxError::UnterminatedLiteral("string")
        );
        // Lexing resumes on the next line.
        assert!(out.tokens.iter().any(|t| t.text == "y"));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let out = tokenize("new x;\n/* never closed");
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].error_kind(), &SyntaxError::UnterminatedComment);
        assert_eq!(out.diagnostics[0].span().start, SourcePos::new(1, 0));
    }

    #[test]
    fn test_utf16_columns() {
        let out = tokenize("new \u{1F600}; new y;");
        // The emoji is an unexpected character occupying two UTF-16 units.
        let y = out.tokens.iter().find(|t| t.text == "y").unwrap();
        assert_eq!(y.span.start.character, 12);
    }

    #[test]
    fn test_line_start_flags() {
        let out = tokenize("new a\nnew b");
        let flags: Vec<bool> = out.tokens.iter().map(|t| t.line_start).collect();
        assert_eq!(flags, vec![true, false, true, false]);
    }
}
