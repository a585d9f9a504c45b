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

//! AMX Mod X Pawn Language Server Protocol (LSP) Implementation
//!
//! This crate provides IDE support for AMX Mod X plugins (`.sma`) and
//! include files (`.inc`) through the Language Server Protocol.
//!
//! # Features
//!
//! - **Diagnostics**: Syntax findings for every open document and every
//!   include file it reaches, plus unresolved and unreadable includes
//! - **Go to Definition**: Jump to callables and globals across includes, or
//!   to an included file from its directive
//! - **Hover**: Declaration and documentation comment of the symbol
//! - **Signature Help**: Parameter list of the call being typed
//! - **Autocomplete**: Everything visible through the include closure, plus
//!   keywords and preprocessor directives
//! - **Document Symbols**: Outline of the document's own functions
//! - **Document Links**: Include directives linked to the online API
//!   reference (opt-in)
//!
//! # Include Tracking
//!
//! Include files are read from disk when first reached and cached. A
//! reference-counted dependency graph records which file includes which;
//! after every reparse or close, files no open document can reach are
//! dropped together with their diagnostics.
//!
//! # Usage
//!
//! ```bash
//! # Run the language server (stdio transport)
//! amxx-lsp
//!
//! # With debug logging
//! RUST_LOG=amxx_lsp=debug amxx-lsp
//! ```
//!
//! ## Programmatic Usage
//!
//! ```no_run
//! use amxx_lsp::AmxxLanguageServer;
//! use tower_lsp::{LspService, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let stdin = tokio::io::stdin();
//!     let stdout = tokio::io::stdout();
//!
//!     let (service, socket) = LspService::new(AmxxLanguageServer::new);
//!     Server::new(stdin, stdout, socket).serve(service).await;
//! }
//! ```
//!
//! ## Without a Client
//!
//! The engine is usable on its own through [`workspace::Workspace`]:
//!
//! ```no_run
//! use amxx_lsp::config::Settings;
//! use amxx_lsp::workspace::Workspace;
//! use tower_lsp::lsp_types::Url;
//!
//! let mut workspace = Workspace::new(Settings::default(), None);
//! let uri = Url::parse("file:///plugins/hello.sma").unwrap();
//! let published = workspace
//!     .open(&uri, "#include <amxmodx>\npublic plugin_init() {}\n", 1)
//!     .unwrap();
//! for (file, diagnostics) in &published {
//!     println!("{}: {} diagnostics", file, diagnostics.len());
//! }
//! ```
//!
//! # Architecture
//!
//! - [`resolver`]: Include file lookup on disk
//! - [`dependency_graph`]: Reference-counted include graph and pruning
//! - [`document_store`]: Open documents and cached include files
//! - [`workspace`]: Reparse passes over the include closure
//! - [`scheduler`]: Per-document debounce of reparses
//! - [`aggregate`]: Symbols visible from a document, in precedence order
//! - [`definition`], [`hover`], [`signature`], [`completion`], [`symbols`],
//!   [`links`]: Query handlers
//! - [`config`]: Client settings and include path expansion
//! - `backend`: The tower-lsp server

pub mod aggregate;
mod backend;
pub mod completion;
pub mod config;
pub mod constants;
pub mod definition;
pub mod dependency_graph;
pub mod document_store;
pub mod error;
pub mod hover;
pub mod links;
pub mod resolver;
pub mod scheduler;
pub mod signature;
pub mod symbols;
pub mod utils;
pub mod workspace;

#[cfg(test)]
mod tests;

pub use backend::AmxxLanguageServer;
pub use error::{WorkspaceError, WorkspaceResult};
pub use workspace::{DiagnosticsMap, Workspace};

/// LSP server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
