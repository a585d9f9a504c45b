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

//! Lexical analysis for Pawn.
//!
//! # Module Structure
//!
//! - [`token`] - Token and comment types, keyword tables
//! - `lexer` - The tokenizer itself, exposed through [`tokenize`]
//!
//! # Examples
//!
//! ```
//! use amxx_parser::lex::{tokenize, TokenKind};
//!
//! let out = tokenize("#include <amxmodx>\npublic plugin_init() {}");
//! assert_eq!(out.tokens[0].kind, TokenKind::Directive);
//! assert_eq!(out.tokens[1].text, "public");
//! assert!(out.diagnostics.is_empty());
//! ```

mod lexer;
pub mod token;

pub use lexer::{tokenize, LexOutput};
pub use token::{is_keyword, Comment, Token, TokenKind, DIRECTIVES, KEYWORDS};
