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

//! Error types for Pawn scanning.
//!
//! Scanning never fails as a whole: every problem found is recorded as a
//! [`SyntaxError`] wrapped in a [`crate::Diagnostic`], and the scanner keeps
//! going. The `Display` output of each variant is the user-facing message.

use thiserror::Error;

/// A recoverable problem found while scanning Pawn source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// `/*` without a matching `*/`.
    #[error("unterminated block comment")]
    UnterminatedComment,

    /// A string or character literal that runs into the end of the line.
    #[error("unterminated {0} literal")]
    UnterminatedLiteral(&'static str),

    /// A character that cannot start any Pawn token.
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    /// A token that cannot start a top-level declaration.
    #[error("unexpected {0}")]
    UnexpectedToken(String),

    /// A `}` with no open block.
    #[error("unmatched '}}'")]
    UnmatchedBrace,

    /// A function or enum body that is still open at end of file.
    #[error("missing closing '}}' for '{0}'")]
    UnterminatedBody(String),

    /// A parameter list that is still open at end of file.
    #[error("missing closing ')' for '{0}'")]
    UnterminatedParameters(String),

    /// A declaration specifier not followed by a name.
    #[error("expected identifier, found {0}")]
    ExpectedIdentifier(String),

    /// A native or forward header followed by something other than `;`.
    #[error("expected ';' after declaration of '{0}'")]
    ExpectedSemicolon(String),

    /// A function header followed by neither a body nor `;`.
    #[error("expected '{{' or ';' after header of '{0}'")]
    ExpectedBody(String),

    /// An enum keyword not followed by `{`.
    #[error("expected '{{' to open enum body")]
    ExpectedEnumBody,

    /// A known directive with an unusable argument.
    #[error("malformed #{directive} directive: {reason}")]
    MalformedDirective {
        /// Directive name without the `#`.
        directive: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A directive the scanner does not know about.
    #[error("unknown preprocessor directive '#{0}'")]
    UnknownDirective(String),

    /// A second function body with the same name.
    #[error("function '{0}' is already defined")]
    Redefinition(String),
}

impl SyntaxError {
    /// Convenience constructor for [`SyntaxError::MalformedDirective`].
    pub fn malformed(directive: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedDirective {
            directive: directive.into(),
            reason,
        }
    }
}
