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

//! Top-level declaration scanner.
//!
//! The scanner walks the token stream at brace depth zero and recognises
//! directives, function headers, global variables and enums. Function bodies
//! are skipped by brace matching; nothing inside them is reported.
//!
//! Pawn statements may end either with `;` or with a line break (semicolons
//! are optional unless `#pragma semicolon 1` is set), so the scanner treats a
//! token at the start of a new line as a statement boundary whenever the
//! previous token cannot continue an expression.
//!
//! On a syntax error the scanner records a diagnostic, skips to the next
//! statement boundary and carries on, so declarations after the error are
//! still found.

use std::collections::HashMap;

use crate::diagnostic::Diagnostic;
use crate::directive::{classify, Directive};
use crate::error::SyntaxError;
use crate::lex::{is_keyword, tokenize, Comment, Token, TokenKind};
use crate::span::Span;
use crate::symbols::{
    Callable, CallableKind, Parameter, ParseResult, Value, ValueKind,
};

/// Options controlling a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// The file is scanned because another file includes it.
    ///
    /// File-local (`static`) symbols are omitted and diagnostics that only
    /// matter for the file being edited are suppressed.
    pub is_dependency: bool,
}

impl ParseOptions {
    /// Options for a file scanned as an include target.
    pub fn dependency() -> Self {
        Self {
            is_dependency: true,
        }
    }
}

/// Scans `text` and returns its diagnostics, include directives and symbols.
///
/// # Examples
///
/// ```
/// use amxx_parser::{parse, ParseOptions};
///
/// let result = parse(
///     "#include <amxmodx>\n\npublic plugin_init()\n{\n}\n",
///     ParseOptions::default(),
/// );
/// assert_eq!(result.includes[0].filename, "amxmodx");
/// assert_eq!(result.callables[0].name, "plugin_init");
/// assert!(result.diagnostics.is_empty());
/// ```
pub fn parse(text: &str, options: ParseOptions) -> ParseResult {
    let lexed = tokenize(text);
    let mut parser = Parser {
        src: text,
        tokens: lexed.tokens,
        comments: lexed.comments,
        pos: 0,
        options,
        conditional_depth: 0,
        bodies: HashMap::new(),
        result: ParseResult {
            diagnostics: lexed.diagnostics,
            ..ParseResult::default()
        },
    };
    parser.run();
    parser.result
}

/// Declaration specifiers seen before a name.
#[derive(Debug, Default, Clone, Copy)]
struct Specifiers {
    public: bool,
    stock: bool,
    native: bool,
    forward: bool,
    is_static: bool,
    new: bool,
    is_const: bool,
    any: bool,
}

impl Specifiers {
    fn callable_kind(&self) -> CallableKind {
        if self.native {
            CallableKind::Native
        } else if self.forward {
            CallableKind::Forward
        } else if self.public {
            CallableKind::Public
        } else if self.stock {
            CallableKind::Stock
        } else if self.is_static {
            CallableKind::Static
        } else {
            CallableKind::Plain
        }
    }

    fn is_prototype(&self) -> bool {
        self.native || self.forward
    }
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token<'a>>,
    comments: Vec<Comment<'a>>,
    pos: usize,
    options: ParseOptions,
    conditional_depth: usize,
    /// Function name -> span of the first body seen.
    bodies: HashMap<String, Span>,
    result: ParseResult,
}

impl<'a> Parser<'a> {
    // ---------------------------------------------------------------------
    // Token cursor
    // ---------------------------------------------------------------------

    #[inline]
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<Token<'a>> {
        self.tokens.get(self.pos + offset).copied()
    }

    #[inline]
    fn advance(&mut self) -> Option<Token<'a>> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }

    fn previous(&self) -> Option<Token<'a>> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i).copied())
    }

    fn eof_span(&self) -> Span {
        self.tokens
            .last()
            .map(|t| Span::point(t.span.end))
            .unwrap_or_default()
    }

    fn describe_next(&self) -> String {
        self.peek()
            .map(|t| t.describe())
            .unwrap_or_else(|| "end of file".to_string())
    }

    fn error(&mut self, error: SyntaxError, span: Span) {
        self.result.diagnostics.push(Diagnostic::error(error, span));
    }

    /// `true` if `tok` begins a new statement after the previous token.
    fn starts_statement(&self, tok: &Token<'_>) -> bool {
        if !tok.line_start {
            return false;
        }
        match self.previous() {
            Some(prev) if prev.kind == TokenKind::Punct => {
                matches!(prev.text, ")" | "]" | "}")
            }
            _ => true,
        }
    }

    // ---------------------------------------------------------------------
    // Top level
    // ---------------------------------------------------------------------

    fn run(&mut self) {
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Directive => {
                    self.advance();
                    self.directive(&tok);
                }
                TokenKind::Ident => self.declaration(),
                TokenKind::Punct if tok.text == ";" => {
                    self.advance();
                }
                TokenKind::Punct if tok.text == "}" => {
                    self.advance();
                    self.error(SyntaxError::UnmatchedBrace, tok.span);
                }
                TokenKind::Punct if tok.text == "{" => {
                    self.error(SyntaxError::UnexpectedToken("'{'".to_string()), tok.span);
                    if self.skip_block().is_none() {
                        self.error(SyntaxError::UnterminatedBody("{".to_string()), tok.span);
                    }
                }
                _ => {
                    self.error(SyntaxError::UnexpectedToken(tok.describe()), tok.span);
                    self.advance();
                    self.recover();
                }
            }
        }
    }

    fn directive(&mut self, tok: &Token<'a>) {
        match classify(tok) {
            Directive::Include(include) => self.result.includes.push(include),
            Directive::Define(def) => {
                let documentation = self.documentation_for(tok);
                self.result.values.push(Value {
                    name: def.name,
                    kind: ValueKind::Define,
                    label: def.label,
                    documentation,
                    is_static: false,
                    name_span: def.name_span,
                });
            }
            Directive::OpenConditional => self.conditional_depth += 1,
            Directive::CloseConditional => {
                self.conditional_depth = self.conditional_depth.saturating_sub(1)
            }
            Directive::Other => {}
            Directive::Unknown(name) => {
                if !self.options.is_dependency {
                    self.result.diagnostics.push(Diagnostic::warning(
                        SyntaxError::UnknownDirective(name),
                        tok.span,
                    ));
                }
            }
            Directive::Malformed(error, span) => self.error(error, span),
        }
    }

    /// Skips to the next statement boundary after a syntax error.
    fn recover(&mut self) {
        while let Some(tok) = self.peek() {
            if tok.kind == TokenKind::Directive {
                return;
            }
            if tok.is_punct(';') {
                self.advance();
                return;
            }
            if tok.is_punct('}') {
                return;
            }
            if tok.is_punct('{') {
                self.skip_block();
                return;
            }
            if self.starts_statement(&tok) {
                return;
            }
            self.advance();
        }
    }

    /// Skips a `{ ... }` block starting at the current `{`.
    ///
    /// Returns the span of the closing brace, or `None` if the block runs to
    /// end of file (in which case all remaining tokens are consumed).
    fn skip_block(&mut self) -> Option<Span> {
        let mut depth = 0usize;
        while let Some(tok) = self.advance() {
            if tok.is_punct('{') {
                depth += 1;
            } else if tok.is_punct('}') {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(tok.span);
                }
            }
        }
        None
    }

    /// Skips a balanced `open ... close` group starting at the current token.
    /// Returns `false` if end of file is reached first.
    fn skip_group(&mut self, open: char, close: char) -> bool {
        let mut depth = 0usize;
        while let Some(tok) = self.advance() {
            if tok.is_punct(open) {
                depth += 1;
            } else if tok.is_punct(close) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return true;
                }
            }
        }
        false
    }

    // ---------------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------------

    fn declaration(&mut self) {
        let Some(first) = self.peek() else { return };
        let documentation = self.documentation_for(&first);
        let mut specs = Specifiers::default();

        while let Some(tok) = self.peek() {
            let flag = match tok.text {
                "public" if tok.kind == TokenKind::Ident => &mut specs.public,
                "stock" if tok.kind == TokenKind::Ident => &mut specs.stock,
                "native" if tok.kind == TokenKind::Ident => &mut specs.native,
                "forward" if tok.kind == TokenKind::Ident => &mut specs.forward,
                "static" if tok.kind == TokenKind::Ident => &mut specs.is_static,
                "new" if tok.kind == TokenKind::Ident => &mut specs.new,
                "const" if tok.kind == TokenKind::Ident => &mut specs.is_const,
                _ => break,
            };
            *flag = true;
            specs.any = true;
            self.advance();
        }

        let Some(tok) = self.peek() else {
            self.error(
                SyntaxError::ExpectedIdentifier("end of file".to_string()),
                self.eof_span(),
            );
            return;
        };

        if tok.is_word("enum") {
            self.advance();
            self.enumeration(&first, specs, documentation);
            return;
        }

        let tag = self.tag();
        if self.peek().is_some_and(|t| t.is_word("operator")) {
            // Operator overloads contribute no named symbol.
            self.skip_operator();
            return;
        }
        let Some(name) = self.peek().filter(|t| t.kind == TokenKind::Ident && !is_keyword(t.text))
        else {
            let found = self.describe_next();
            let span = self.peek().map(|t| t.span).unwrap_or_else(|| self.eof_span());
            if specs.any || tag.is_some() {
                self.error(SyntaxError::ExpectedIdentifier(found), span);
            } else {
                self.error(SyntaxError::UnexpectedToken(found), span);
                self.advance();
            }
            self.recover();
            return;
        };
        self.advance();

        match self.peek() {
            Some(next) if next.is_punct('(') => {
                self.function(&first, specs, tag, name, documentation)
            }
            _ if specs.any && !specs.is_prototype() => {
                self.variables(&first, specs, tag, name, documentation)
            }
            _ => {
                let span = self.peek().map(|t| t.span).unwrap_or(name.span);
                let found = self.describe_next();
                if specs.is_prototype() {
                    self.error(SyntaxError::ExpectedSemicolon(name.text.to_string()), span);
                } else {
                    self.error(SyntaxError::UnexpectedToken(found), span);
                }
                self.recover();
            }
        }
    }

    /// Parses an optional `Tag:` prefix.
    fn tag(&mut self) -> Option<Token<'a>> {
        let tok = self.peek()?;
        let colon = self.peek_at(1)?;
        if tok.kind == TokenKind::Ident && colon.is_punct(':') {
            self.pos += 2;
            Some(tok)
        } else {
            None
        }
    }

    fn function(
        &mut self,
        first: &Token<'a>,
        specs: Specifiers,
        tag: Option<Token<'a>>,
        name: Token<'a>,
        documentation: Option<String>,
    ) {
        let Some(parameters) = self.parameters() else {
            self.error(
                SyntaxError::UnterminatedParameters(name.text.to_string()),
                name.span,
            );
            return;
        };
        let close_paren = self.previous().map(|t| t.span).unwrap_or(name.span);
        let header = &self.src[first.start..self.previous().map(|t| t.end).unwrap_or(name.end)];
        let label = collapse_whitespace(header);

        let mut has_body = false;
        match self.peek() {
            Some(tok) if tok.is_punct('{') => {
                has_body = true;
                if self.skip_block().is_none() {
                    self.error(SyntaxError::UnterminatedBody(name.text.to_string()), name.span);
                }
            }
            Some(tok) if tok.is_punct(';') => {
                self.advance();
            }
            Some(tok) if tok.is_punct('=') && specs.native => {
                // `native foo() = bar;`
                self.advance();
                self.recover();
            }
            Some(tok) if !self.starts_statement(&tok) => {
                let error = if specs.is_prototype() {
                    SyntaxError::ExpectedSemicolon(name.text.to_string())
                } else {
                    SyntaxError::ExpectedBody(name.text.to_string())
                };
                self.error(error, tok.span);
                self.recover();
            }
            _ => {}
        }

        if has_body && self.conditional_depth == 0 {
            if self.bodies.contains_key(name.text) {
                self.error(SyntaxError::Redefinition(name.text.to_string()), name.span);
            } else {
                self.bodies.insert(name.text.to_string(), name.span);
            }
        }

        if specs.is_static && self.options.is_dependency {
            return;
        }

        self.result.callables.push(Callable {
            name: name.text.to_string(),
            kind: specs.callable_kind(),
            return_tag: tag.map(|t| t.text.to_string()),
            parameters,
            label,
            documentation,
            range: first.span.to(close_paren),
            name_span: name.span,
            has_body,
        });
    }

    /// Parses `( ... )`, splitting top-level commas into parameters.
    /// Returns `None` if the list is not closed before end of file.
    fn parameters(&mut self) -> Option<Vec<Parameter>> {
        self.advance(); // (
        let mut params = Vec::new();
        let mut depth = 0usize;
        let mut current: Option<(usize, usize)> = None;

        loop {
            let tok = self.advance()?;
            let at_top = depth == 0;
            if at_top && (tok.is_punct(')') || tok.is_punct(',')) {
                if let Some((start, end)) = current.take() {
                    params.push(Parameter {
                        label: collapse_whitespace(&self.src[start..end]),
                    });
                }
                if tok.is_punct(')') {
                    return Some(params);
                }
                continue;
            }
            if tok.is_punct('(') || tok.is_punct('[') || tok.is_punct('{') {
                depth += 1;
            } else if tok.is_punct(')') || tok.is_punct(']') || tok.is_punct('}') {
                depth = depth.saturating_sub(1);
            }
            current = Some(match current {
                Some((start, _)) => (start, tok.end),
                None => (tok.start, tok.end),
            });
        }
    }

    fn variables(
        &mut self,
        first: &Token<'a>,
        specs: Specifiers,
        tag: Option<Token<'a>>,
        name: Token<'a>,
        documentation: Option<String>,
    ) {
        let prefix_end = tag.map_or(name.start, |t| t.start);
        let prefix = collapse_whitespace(&self.src[first.start..prefix_end]);
        let kind = if specs.is_const {
            ValueKind::Constant
        } else {
            ValueKind::Variable
        };

        let mut tag = tag;
        let mut name = name;
        loop {
            // Array dimensions.
            while self.peek().is_some_and(|t| t.is_punct('[')) {
                if !self.skip_group('[', ']') {
                    break;
                }
            }
            let declarator_start = tag.map_or(name.start, |t| t.start);
            let declarator_end = self.previous().map_or(name.end, |t| t.end);
            let label = format!(
                "{} {}",
                prefix,
                collapse_whitespace(&self.src[declarator_start..declarator_end])
            );

            if !(specs.is_static && self.options.is_dependency) {
                self.result.values.push(Value {
                    name: name.text.to_string(),
                    kind,
                    label,
                    documentation: documentation.clone(),
                    is_static: specs.is_static,
                    name_span: name.span,
                });
            }

            if self.peek().is_some_and(|t| t.is_punct('=')) {
                self.advance();
                self.skip_initializer();
            }

            match self.peek() {
                Some(tok) if tok.is_punct(',') => {
                    self.advance();
                    tag = self.tag();
                    match self.peek() {
                        Some(next) if next.kind == TokenKind::Ident && !is_keyword(next.text) => {
                            self.advance();
                            name = next;
                        }
                        _ => {
                            let span =
                                self.peek().map(|t| t.span).unwrap_or_else(|| self.eof_span());
                            let found = self.describe_next();
                            self.error(SyntaxError::ExpectedIdentifier(found), span);
                            self.recover();
                            return;
                        }
                    }
                }
                Some(tok) if tok.is_punct(';') => {
                    self.advance();
                    return;
                }
                None => return,
                Some(tok) if self.starts_statement(&tok) => return,
                Some(tok) => {
                    self.error(SyntaxError::UnexpectedToken(tok.describe()), tok.span);
                    self.recover();
                    return;
                }
            }
        }
    }

    /// Skips an initializer up to `,` or `;` at depth zero or a statement
    /// boundary.
    fn skip_initializer(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            if depth == 0 {
                if tok.is_punct(',') || tok.is_punct(';') || tok.kind == TokenKind::Directive {
                    return;
                }
                if self.starts_statement(&tok) {
                    return;
                }
            }
            if tok.is_punct('(') || tok.is_punct('[') || tok.is_punct('{') {
                depth += 1;
            } else if tok.is_punct(')') || tok.is_punct(']') || tok.is_punct('}') {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            }
            self.advance();
        }
    }

    fn enumeration(&mut self, first: &Token<'a>, specs: Specifiers, documentation: Option<String>) {
        // `enum (<<= 1) { ... }` increment clause.
        if self.peek().is_some_and(|t| t.is_punct('(')) {
            self.skip_group('(', ')');
        }
        let tag = self.tag();
        let mut enum_name = self
            .peek()
            .filter(|t| t.kind == TokenKind::Ident && !is_keyword(t.text));
        if enum_name.is_some() {
            self.advance();
        } else if tag.is_some_and(|t| t.text != "_") {
            // `enum Name: { ... }`
            enum_name = tag;
        }
        // `enum Name:` gives members the enum's tag.
        if self.peek().is_some_and(|t| t.is_punct(':')) {
            self.advance();
        }

        let Some(open) = self.peek().filter(|t| t.is_punct('{')) else {
            let span = self.peek().map(|t| t.span).unwrap_or(first.span);
            self.error(SyntaxError::ExpectedEnumBody, span);
            self.recover();
            return;
        };
        self.advance();

        let visible = !(specs.is_static && self.options.is_dependency);
        if let (Some(name), true) = (enum_name, visible) {
            self.result.values.push(Value {
                name: name.text.to_string(),
                kind: ValueKind::Enum,
                label: format!("enum {}", name.text),
                documentation: documentation.clone(),
                is_static: specs.is_static,
                name_span: name.span,
            });
        }

        loop {
            let Some(tok) = self.peek() else {
                let what = enum_name.map_or("enum", |t| t.text).to_string();
                self.error(SyntaxError::UnterminatedBody(what), open.span);
                return;
            };
            if tok.is_punct('}') {
                self.advance();
                if self.peek().is_some_and(|t| t.is_punct(';')) {
                    self.advance();
                }
                return;
            }
            if tok.is_punct(',') || tok.kind == TokenKind::Directive {
                self.advance();
                continue;
            }

            let member_doc = self.documentation_for(&tok);
            let _member_tag = self.tag();
            match self.peek() {
                Some(member) if member.kind == TokenKind::Ident => {
                    self.advance();
                    if visible {
                        let label = match enum_name {
                            Some(e) => format!("{}:{}", e.text, member.text),
                            None => member.text.to_string(),
                        };
                        self.result.values.push(Value {
                            name: member.text.to_string(),
                            kind: ValueKind::EnumMember,
                            label,
                            documentation: member_doc,
                            is_static: specs.is_static,
                            name_span: member.span,
                        });
                    }
                }
                Some(other) => {
                    self.error(SyntaxError::ExpectedIdentifier(other.describe()), other.span);
                    self.advance();
                }
                None => continue,
            }
            // Skip `[size]` and `= value` up to the next separator.
            let mut depth = 0usize;
            while let Some(t) = self.peek() {
                if depth == 0 && (t.is_punct(',') || t.is_punct('}')) {
                    break;
                }
                if t.is_punct('(') || t.is_punct('[') || t.is_punct('{') {
                    depth += 1;
                } else if t.is_punct(')') || t.is_punct(']') || t.is_punct('}') {
                    depth = depth.saturating_sub(1);
                }
                self.advance();
            }
        }
    }

    fn skip_operator(&mut self) {
        self.advance(); // operator
        while let Some(tok) = self.peek() {
            if tok.is_punct('(') {
                break;
            }
            self.advance();
        }
        if !self.skip_group('(', ')') {
            return;
        }
        match self.peek() {
            Some(tok) if tok.is_punct('{') => {
                self.skip_block();
            }
            Some(tok) if tok.is_punct(';') => {
                self.advance();
            }
            _ => {}
        }
    }

    // ---------------------------------------------------------------------
    // Documentation comments
    // ---------------------------------------------------------------------

    /// Returns the comment block ending on the line directly above `tok`.
    fn documentation_for(&self, tok: &Token<'_>) -> Option<String> {
        let line = tok.span.start.line;
        if line == 0 {
            return None;
        }
        // Comments are in source order.
        let mut i = self
            .comments
            .partition_point(|c| c.span.end <= tok.span.start);
        let mut expected_line = line - 1;
        let mut parts: Vec<String> = Vec::new();
        while i > 0 {
            let comment = &self.comments[i - 1];
            if comment.span.end.line != expected_line {
                break;
            }
            // A trailing comment after code on the same line belongs to that code.
            if self.line_has_code_before(comment) {
                break;
            }
            parts.push(comment.content());
            if comment.is_block || comment.span.start.line == 0 {
                break;
            }
            expected_line = comment.span.start.line - 1;
            i -= 1;
        }
        if parts.is_empty() {
            return None;
        }
        parts.reverse();
        let doc = parts.join("\n").trim().to_string();
        (!doc.is_empty()).then_some(doc)
    }

    fn line_has_code_before(&self, comment: &Comment<'_>) -> bool {
        let idx = self
            .tokens
            .partition_point(|t| t.span.start < comment.span.start);
        idx > 0 && self.tokens[idx - 1].span.end.line == comment.span.start.line
    }
}

/// Collapses runs of whitespace (including line breaks) into single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
