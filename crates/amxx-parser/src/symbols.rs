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

//! Symbols and include directives extracted from a Pawn file.

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// How a function-like symbol was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallableKind {
    /// `public name(...)`, callable by the host.
    Public,
    /// `stock name(...)`, only compiled in when used.
    Stock,
    /// `native name(...)`, implemented by the host or a module.
    Native,
    /// `forward name(...)`, a callback prototype.
    Forward,
    /// `static name(...)`, file-local.
    Static,
    /// A function without any specifier.
    Plain,
}

impl CallableKind {
    /// The keyword that introduces this kind, if any.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Public => Some("public"),
            Self::Stock => Some("stock"),
            Self::Native => Some("native"),
            Self::Forward => Some("forward"),
            Self::Static => Some("static"),
            Self::Plain => None,
        }
    }
}

/// A single formal parameter, as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    /// Normalised parameter text, e.g. `const name[]` or `Float:origin[3]`.
    pub label: String,
}

/// A function-like symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Callable {
    /// Function name.
    pub name: String,
    /// Declaration kind.
    pub kind: CallableKind,
    /// Return tag, e.g. `Float` in `Float:get_speed()`.
    pub return_tag: Option<String>,
    /// Formal parameters in order.
    pub parameters: Vec<Parameter>,
    /// Declaration header, e.g. `native get_user_name(index, name[], len)`.
    pub label: String,
    /// Documentation comment directly above the declaration.
    pub documentation: Option<String>,
    /// Span of the whole header, from the first specifier to the closing `)`.
    pub range: Span,
    /// Span of the name.
    pub name_span: Span,
    /// `true` if the declaration has a `{ ... }` body.
    pub has_body: bool,
}

/// What kind of non-function symbol a [`Value`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    /// A mutable global (`new`, `static`, `public`, `stock`).
    Variable,
    /// A `const` global.
    Constant,
    /// A `#define` macro.
    Define,
    /// A named `enum`.
    Enum,
    /// An entry of an `enum`.
    EnumMember,
}

/// A non-function symbol: global variable, constant, macro or enum entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Value {
    /// Symbol name.
    pub name: String,
    /// Symbol kind.
    pub kind: ValueKind,
    /// Declaration text shown on hover, e.g. `new const g_szPrefix[]`.
    pub label: String,
    /// Documentation comment directly above the declaration.
    pub documentation: Option<String>,
    /// `true` if declared `static` (file-local).
    pub is_static: bool,
    /// Span of the name.
    pub name_span: Span,
}

/// An `#include` or `#tryinclude` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncludeDirective {
    /// File name as written, without delimiters.
    pub filename: String,
    /// `"file"` form: the including file's directory is searched first.
    pub is_local: bool,
    /// `#tryinclude`: failure to resolve is informational.
    pub is_silent: bool,
    /// Span of the file name including its `<>` or `""` delimiters.
    pub span: Span,
}

/// Everything the scanner extracts from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    /// Findings in source order.
    pub diagnostics: Vec<Diagnostic>,
    /// Include directives in source order.
    pub includes: Vec<IncludeDirective>,
    /// Function-like symbols in source order.
    pub callables: Vec<Callable>,
    /// Other symbols in source order.
    pub values: Vec<Value>,
}

impl ParseResult {
    /// Returns `true` if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == crate::Severity::Error)
    }

    /// Finds a callable by name.
    pub fn callable(&self, name: &str) -> Option<&Callable> {
        self.callables.iter().find(|c| c.name == name)
    }

    /// Finds a value by name.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.name == name)
    }
}
