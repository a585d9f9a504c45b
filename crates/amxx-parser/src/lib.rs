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

//! Declaration scanner for AMX Mod X Pawn sources.
//!
//! This crate turns the text of a `.sma` or `.inc` file into the facts an
//! editor needs: include directives, callable and value declarations with
//! their documentation, and syntax diagnostics. It never fails as a whole;
//! malformed input produces diagnostics alongside whatever could be read.
//!
//! # Lexical Analysis
//!
//! The [`lex`] module exposes the tokenizer on its own:
//!
//! - Identifiers (including `@`-prefixed ones), numbers and punctuation
//! - String and character literals with the `^` control character
//! - Whole-line preprocessor directives with `\` continuations
//! - Comments, kept for documentation lookup
//!
//! # Examples
//!
//! ```
//! use amxx_parser::{parse, CallableKind, ParseOptions, ValueKind};
//!
//! let src = "\
//! #include <amxmodx>
//!
//! new g_count;
//!
//! /** Called once on map load. */
//! public plugin_init()
//! {
//!     register_plugin(\"Demo\", \"1.0\", \"me\");
//! }
//! ";
//! let result = parse(src, ParseOptions::default());
//! assert!(!result.has_errors());
//! assert_eq!(result.includes.len(), 1);
//! assert_eq!(result.values[0].kind, ValueKind::Variable);
//!
//! let init = result.callable("plugin_init").unwrap();
//! assert_eq!(init.kind, CallableKind::Public);
//! assert_eq!(init.documentation.as_deref(), Some("Called once on map load."));
//! ```

mod diagnostic;
mod directive;
mod error;
pub mod lex;
mod parser;
mod span;
mod symbols;

pub use diagnostic::{Diagnostic, Severity};
pub use error::SyntaxError;
pub use lex::KEYWORDS;
pub use parser::{parse, ParseOptions};
pub use span::{SourcePos, Span};
pub use symbols::{
    Callable, CallableKind, IncludeDirective, ParseResult, Parameter, Value, ValueKind,
};
