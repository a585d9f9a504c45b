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

//! AMX Mod X Pawn Language Server binary.
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
//! # Editor Integration
//!
//! ## Neovim (nvim-lspconfig)
//!
//! ```lua
//! require('lspconfig.configs').amxxpawn = {
//!   default_config = {
//!     cmd = { 'amxx-lsp' },
//!     filetypes = { 'sourcepawn', 'pawn' },
//!     root_dir = function() return vim.fn.getcwd() end,
//!     settings = {
//!       amxxpawn = { compiler = { includePaths = { '${workspaceFolder}/include' } } },
//!     },
//!   },
//! }
//! require('lspconfig').amxxpawn.setup {}
//! ```

use amxx_lsp::AmxxLanguageServer;
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging to stderr; stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("amxx_lsp=info".parse().expect("valid log directive"))
                .add_directive("tower_lsp=info".parse().expect("valid log directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting AMXX Pawn Language Server v{}", amxx_lsp::VERSION);

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(AmxxLanguageServer::new);

    Server::new(stdin, stdout, socket).serve(service).await;
}
