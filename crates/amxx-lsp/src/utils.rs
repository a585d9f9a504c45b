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

//! Conversions between parser and LSP types, and position helpers.
//!
//! LSP positions count columns in UTF-16 code units. The parser already
//! reports spans in those units, so the conversions here are direct; the
//! helpers that work on raw line text do the UTF-16 bookkeeping themselves
//! and never slice inside a character.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use amxx_parser::{Severity, SourcePos, Span};
use ropey::Rope;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};

use crate::constants::DIAGNOSTIC_SOURCE;

/// Converts a parser position to an LSP position.
#[inline]
pub fn to_position(pos: SourcePos) -> Position {
    Position::new(pos.line, pos.character)
}

/// Converts a parser span to an LSP range.
#[inline]
pub fn to_range(span: Span) -> Range {
    Range::new(to_position(span.start), to_position(span.end))
}

/// Converts a parser severity to the LSP severity.
pub fn to_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}

/// Converts a parser diagnostic to an LSP diagnostic.
pub fn to_lsp_diagnostic(diagnostic: &amxx_parser::Diagnostic) -> Diagnostic {
    engine_diagnostic(
        to_range(diagnostic.span()),
        to_severity(diagnostic.severity()),
        diagnostic.message(),
    )
}

/// Builds an engine diagnostic (unresolved include, unreadable dependency).
pub fn engine_diagnostic(
    range: Range,
    severity: DiagnosticSeverity,
    message: String,
) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(severity),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message,
        ..Default::default()
    }
}

/// Hash of document content used for change detection.
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Returns line `line` of `rope` without its line terminator.
pub fn line_text(rope: &Rope, line: u32) -> Option<String> {
    let slice = rope.get_line(line as usize)?;
    let mut text = slice.to_string();
    while text.ends_with('\n') || text.ends_with('\r') {
        text.pop();
    }
    Some(text)
}

/// Byte offset in `line` of UTF-16 column `character`.
///
/// Columns past the end of the line clamp to the line length; a column that
/// falls inside a surrogate pair rounds down to the start of that character.
pub fn byte_offset(line: &str, character: u32) -> usize {
    let mut units = 0u32;
    for (idx, ch) in line.char_indices() {
        let next = units + ch.len_utf16() as u32;
        if next > character {
            return idx;
        }
        units = next;
    }
    line.len()
}

/// Characters that may appear in a Pawn identifier.
#[inline]
pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '@'
}

/// Finds the identifier touching UTF-16 column `character` in `line`.
///
/// A cursor placed just after the last character of a word still selects
/// it. Returns the word with its start and end columns; numbers are not
/// words.
///
/// # Example
///
/// ```
/// use amxx_lsp::utils::word_at;
///
/// let (word, start, end) = word_at("    client_print(id, print_chat)", 8).unwrap();
/// assert_eq!(word, "client_print");
/// assert_eq!((start, end), (4, 16));
/// ```
pub fn word_at(line: &str, character: u32) -> Option<(String, u32, u32)> {
    let mut chars: Vec<(u32, char)> = Vec::with_capacity(line.len());
    let mut units = 0u32;
    for ch in line.chars() {
        chars.push((units, ch));
        units += ch.len_utf16() as u32;
    }

    let on_word = |i: usize| chars.get(i).is_some_and(|(_, c)| is_word_char(*c));
    let idx = chars
        .iter()
        .position(|(start, _)| *start >= character)
        .unwrap_or(chars.len());
    let anchor = if on_word(idx) {
        idx
    } else if idx > 0 && on_word(idx - 1) {
        idx - 1
    } else {
        return None;
    };

    let mut start = anchor;
    while start > 0 && on_word(start - 1) {
        start -= 1;
    }
    let mut end = anchor + 1;
    while on_word(end) {
        end += 1;
    }

    let word: String = chars[start..end].iter().map(|(_, c)| *c).collect();
    if word.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let (last_start, last) = chars[end - 1];
    Some((word, chars[start].0, last_start + last.len_utf16() as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use amxx_parser::SyntaxError;

    #[test]
    fn test_to_range() {
        let span = Span::new(SourcePos::new(3, 9), SourcePos::new(3, 18));
        let range = to_range(span);
        assert_eq!(range.start, Position::new(3, 9));
        assert_eq!(range.end, Position::new(3, 18));
    }

    #[test]
    fn test_to_lsp_diagnostic() {
        let diag = amxx_parser::Diagnostic::warning(
            SyntaxError::UnknownDirective("frob".into()),
            Span::point(SourcePos::new(1, 0)),
        );
        let lsp = to_lsp_diagnostic(&diag);
        assert_eq!(lsp.severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(lsp.source.as_deref(), Some(DIAGNOSTIC_SOURCE));
        assert_eq!(lsp.message, diag.message());
    }

    #[test]
    fn test_content_hash_detects_changes() {
        assert_eq!(content_hash("new a;"), content_hash("new a;"));
        assert_ne!(content_hash("new a;"), content_hash("new b;"));
    }

    #[test]
    fn test_line_text() {
        let rope = Rope::from_str("first\r\nsecond\nthird");
        assert_eq!(line_text(&rope, 0).as_deref(), Some("first"));
        assert_eq!(line_text(&rope, 1).as_deref(), Some("second"));
        assert_eq!(line_text(&rope, 2).as_deref(), Some("third"));
        assert_eq!(line_text(&rope, 9), None);
    }

    #[test]
    fn test_byte_offset_utf16() {
        let line = "a\u{1F600}b";
        assert_eq!(byte_offset(line, 0), 0);
        assert_eq!(byte_offset(line, 1), 1);
        // Inside the surrogate pair.
        assert_eq!(byte_offset(line, 2), 1);
        assert_eq!(byte_offset(line, 3), 5);
        assert_eq!(byte_offset(line, 100), line.len());
    }

    #[test]
    fn test_word_at_boundaries() {
        let line = "set_task(1.0, \"@think\")";
        assert_eq!(word_at(line, 0).map(|w| w.0), Some("set_task".to_string()));
        assert_eq!(word_at(line, 8).map(|w| w.0), Some("set_task".to_string()));
        assert_eq!(word_at(line, 16).map(|w| w.0), Some("@think".to_string()));
        // Numbers are not identifiers.
        assert_eq!(word_at(line, 10), None);
    }

    #[test]
    fn test_word_at_whitespace() {
        assert_eq!(word_at("new   x", 4), None);
        assert_eq!(word_at("", 0), None);
    }

    #[test]
    fn test_word_at_after_wide_char() {
        let line = "\u{1F600} foo";
        let (word, start, end) = word_at(line, 4).unwrap();
        assert_eq!(word, "foo");
        assert_eq!((start, end), (3, 6));
    }
}
