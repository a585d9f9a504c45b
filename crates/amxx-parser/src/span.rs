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

//! Source positions and spans.
//!
//! Positions use the same coordinate system as the Language Server Protocol:
//! 0-based lines and 0-based columns counted in UTF-16 code units. This lets
//! the language server hand spans straight to the editor without any
//! re-encoding step.
//!
//! # Examples
//!
//! ```
//! use amxx_parser::{SourcePos, Span};
//!
//! let span = Span::new(SourcePos::new(2, 4), SourcePos::new(2, 10));
//! assert!(span.is_single_line());
//! assert!(span.contains(SourcePos::new(2, 6)));
//! assert!(!span.contains(SourcePos::new(3, 0)));
//! ```

use std::fmt;

/// A position in source text (0-based line, 0-based UTF-16 column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourcePos {
    /// Line number (0-based).
    pub line: u32,
    /// Column in UTF-16 code units (0-based).
    pub character: u32,
}

impl SourcePos {
    /// Creates a new source position.
    #[inline]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// Advances this position over `text`, returning the position just past it.
    ///
    /// Line breaks reset the column; every other character advances the column
    /// by its UTF-16 length.
    pub fn advanced_by(self, text: &str) -> Self {
        let mut pos = self;
        for ch in text.chars() {
            if ch == '\n' {
                pos.line += 1;
                pos.character = 0;
            } else {
                pos.character += ch.len_utf16() as u32;
            }
        }
        pos
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// A half-open range of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Start position (inclusive).
    pub start: SourcePos,
    /// End position (exclusive).
    pub end: SourcePos,
}

impl Span {
    /// Creates a new span.
    #[inline]
    pub const fn new(start: SourcePos, end: SourcePos) -> Self {
        Self { start, end }
    }

    /// Creates a zero-width span at `pos`.
    #[inline]
    pub const fn point(pos: SourcePos) -> Self {
        Self { start: pos, end: pos }
    }

    /// Returns a span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns `true` if `pos` lies within `[start, end]`.
    ///
    /// The end is inclusive so that a cursor placed right after an identifier
    /// still counts as "on" it, which is what editors send for hover requests.
    pub fn contains(&self, pos: SourcePos) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Returns `true` if the span starts and ends on the same line.
    #[inline]
    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advanced_by_ascii() {
        let pos = SourcePos::new(0, 3).advanced_by("abc");
        assert_eq!(pos, SourcePos::new(0, 6));
    }

    #[test]
    fn test_advanced_by_newline_resets_column() {
        let pos = SourcePos::new(4, 9).advanced_by("x\nyz");
        assert_eq!(pos, SourcePos::new(5, 2));
    }

    #[test]
    fn test_advanced_by_counts_utf16_units() {
        // U+1F600 is a surrogate pair in UTF-16.
        let pos = SourcePos::new(0, 0).advanced_by("a\u{1F600}é");
        assert_eq!(pos, SourcePos::new(0, 4));
    }

    #[test]
    fn test_span_contains_is_end_inclusive() {
        let span = Span::new(SourcePos::new(1, 2), SourcePos::new(1, 5));
        assert!(span.contains(SourcePos::new(1, 2)));
        assert!(span.contains(SourcePos::new(1, 5)));
        assert!(!span.contains(SourcePos::new(1, 6)));
        assert!(!span.contains(SourcePos::new(0, 3)));
    }

    #[test]
    fn test_span_to_merges() {
        let a = Span::new(SourcePos::new(1, 2), SourcePos::new(1, 5));
        let b = Span::new(SourcePos::new(3, 0), SourcePos::new(3, 1));
        let merged = a.to(b);
        assert_eq!(merged.start, SourcePos::new(1, 2));
        assert_eq!(merged.end, SourcePos::new(3, 1));
        assert!(!merged.is_single_line());
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(SourcePos::new(0, 0).to_string(), "1:1");
    }
}
