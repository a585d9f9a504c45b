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

//! Scanner diagnostics.

use crate::error::SyntaxError;
use crate::span::Span;

/// Severity of a diagnostic, mirroring the LSP severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Editor hint.
    Hint,
    /// Informational message.
    Information,
    /// Might be an issue.
    Warning,
    /// Definitely an issue.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hint => write!(f, "hint"),
            Self::Information => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A finding produced while scanning a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    error: SyntaxError,
    span: Span,
}

impl Diagnostic {
    pub fn error(error: SyntaxError, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            error,
            span,
        }
    }

    pub fn warning(error: SyntaxError, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            error,
            span,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn error_kind(&self) -> &SyntaxError {
        &self.error
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.span.start, self.severity, self.error)
    }
}
