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

//! LSP backend implementation.
//!
//! The backend owns one [`Workspace`] behind a mutex. Every notification
//! that changes a document runs a reparse pass while holding the lock, then
//! releases it and publishes the resulting diagnostics, so a file's
//! diagnostics always reflect a complete pass over its include closure.
//!
//! - **Open / save**: reparsed immediately.
//! - **Change**: the text is stored at once; the reparse is debounced per
//!   document by the [`ReparseScheduler`].
//! - **Close**: pending reparse cancelled, references released, the graph
//!   pruned and stale diagnostics cleared.
//! - **Configuration**: settings are fetched lazily through
//!   `workspace/configuration`, cached, and re-fetched when the client
//!   reports a change; every open document is then reparsed.
//! - **Watched files**: changed include files on disk are re-read.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, error, info, warn};

use crate::completion::get_completions;
use crate::config::Settings;
use crate::constants::{
    BYTES_PER_MEGABYTE, COMPLETION_TRIGGER_CHARACTERS, CONFIG_SECTION, DEFAULT_MAX_DOCUMENT_SIZE,
    SIGNATURE_TRIGGER_CHARACTERS,
};
use crate::definition::get_definition;
use crate::error::WorkspaceError;
use crate::hover::get_hover;
use crate::links::get_document_links;
use crate::resolver::uri_to_path;
use crate::scheduler::{ReparseHandler, ReparseScheduler};
use crate::signature::get_signature_help;
use crate::symbols::get_document_symbols;
use crate::workspace::{DiagnosticsMap, Workspace};

/// Glob registered for `workspace/didChangeWatchedFiles`.
const WATCHED_FILES_GLOB: &str = "**/*.{inc,sma,sp}";

/// State shared between request handlers and debounced reparse tasks.
pub(crate) struct ServerState {
    client: Client,
    workspace: Mutex<Workspace>,
    /// The client answers `workspace/configuration`.
    configuration_capable: AtomicBool,
    /// Cached settings must be fetched before the next reparse.
    settings_stale: AtomicBool,
}

impl ServerState {
    /// Publishes a pass result, attaching the editor version of open files.
    async fn publish(&self, published: DiagnosticsMap) {
        let batch: Vec<(Url, Vec<Diagnostic>, Option<i32>)> = {
            let workspace = self.workspace.lock();
            let mut batch: Vec<_> = published
                .into_iter()
                .map(|(uri, diagnostics)| {
                    let version = workspace.document(&uri).map(|doc| doc.version);
                    (uri, diagnostics, version)
                })
                .collect();
            batch.sort_by(|a, b| a.0.cmp(&b.0));
            batch
        };

        for (uri, diagnostics, version) in batch {
            debug!("Publishing {} diagnostics for {}", diagnostics.len(), uri);
            self.client.publish_diagnostics(uri, diagnostics, version).await;
        }
    }

    async fn reparse_now(&self, uri: &Url) {
        let published = self.workspace.lock().reparse(uri);
        self.publish(published).await;
    }

    /// Fetches the `amxxpawn` section from the client, scoped to the
    /// document that triggered the fetch if any.
    ///
    /// Any failure is logged and yields the default settings.
    async fn fetch_settings(&self, scope: Option<&Url>) -> Settings {
        match self.client.configuration(vec![configuration_item(scope)]).await {
            Ok(values) => {
                let value = values.into_iter().next().unwrap_or(Value::Null);
                Settings::from_value(value).unwrap_or_else(|e| {
                    error!("Could not apply configuration: {}", e);
                    Settings::default()
                })
            }
            Err(e) => {
                error!("Could not fetch configuration: {}", e);
                Settings::default()
            }
        }
    }

    /// Fetches settings if the cached ones were invalidated.
    ///
    /// Returns `true` if new settings were applied, in which case every open
    /// document has been reparsed and published.
    async fn refresh_settings_if_stale(&self, scope: &Url) -> bool {
        if !self.configuration_capable.load(Ordering::Acquire)
            || !self.settings_stale.swap(false, Ordering::AcqRel)
        {
            return false;
        }
        let settings = self.fetch_settings(Some(scope)).await;
        self.apply_settings(settings).await;
        true
    }

    async fn apply_settings(&self, settings: Settings) {
        let published = {
            let mut workspace = self.workspace.lock();
            if workspace.settings() == &settings {
                debug!("Configuration unchanged");
                return;
            }
            info!(
                "Applying configuration: {} include paths, web API links {}",
                settings.compiler.include_paths.len(),
                settings.language.web_api_links
            );
            workspace.set_settings(settings);
            workspace.reparse_all()
        };
        self.publish(published).await;
    }
}

#[tower_lsp::async_trait]
impl ReparseHandler for ServerState {
    async fn reparse(&self, uri: Url) {
        debug!("Debounced reparse of {}", uri);
        self.reparse_now(&uri).await;
    }
}

/// AMX Mod X Pawn language server backend.
pub struct AmxxLanguageServer {
    state: Arc<ServerState>,
    scheduler: ReparseScheduler<ServerState>,
}

impl AmxxLanguageServer {
    /// Create a new language server with the default document size limit.
    pub fn new(client: Client) -> Self {
        Self::with_max_document_size(client, DEFAULT_MAX_DOCUMENT_SIZE)
    }

    /// Create a new language server with a custom document size limit.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use amxx_lsp::AmxxLanguageServer;
    /// use tower_lsp::LspService;
    ///
    /// // Reject documents and include files above 1 MB.
    /// let (service, socket) = LspService::new(|client| {
    ///     AmxxLanguageServer::with_max_document_size(client, 1024 * 1024)
    /// });
    /// ```
    pub fn with_max_document_size(client: Client, max_document_size: usize) -> Self {
        let state = Arc::new(ServerState {
            client,
            workspace: Mutex::new(Workspace::default().with_max_document_size(max_document_size)),
            configuration_capable: AtomicBool::new(false),
            settings_stale: AtomicBool::new(true),
        });
        Self {
            scheduler: ReparseScheduler::new(Arc::clone(&state)),
            state,
        }
    }

    /// Runs `f` against the current workspace state.
    pub fn with_workspace<R>(&self, f: impl FnOnce(&Workspace) -> R) -> R {
        f(&*self.state.workspace.lock())
    }

    /// Returns `true` if a debounced reparse of `uri` is waiting.
    pub fn has_pending_reparse(&self, uri: &Url) -> bool {
        self.scheduler.is_pending(uri)
    }

    async fn register_dynamic_capabilities(&self) {
        let mut registrations = Vec::new();
        if self.state.configuration_capable.load(Ordering::Acquire) {
            registrations.push(Registration {
                id: "amxxpawn-configuration".to_string(),
                method: "workspace/didChangeConfiguration".to_string(),
                register_options: None,
            });
        }
        let watchers = DidChangeWatchedFilesRegistrationOptions {
            watchers: vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String(WATCHED_FILES_GLOB.to_string()),
                kind: None,
            }],
        };
        match serde_json::to_value(watchers) {
            Ok(options) => registrations.push(Registration {
                id: "amxxpawn-watched-files".to_string(),
                method: "workspace/didChangeWatchedFiles".to_string(),
                register_options: Some(options),
            }),
            Err(e) => warn!("Could not encode file watcher registration: {}", e),
        }

        if let Err(e) = self.state.client.register_capability(registrations).await {
            warn!("Client rejected capability registration: {}", e);
        }
    }
}

/// Workspace root from the initialize request.
#[allow(deprecated)]
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    let uri = params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri)
        .or(params.root_uri.as_ref())?;
    uri_to_path(uri).ok()
}

/// The request for the `amxxpawn` section, optionally scoped to a document.
fn configuration_item(scope: Option<&Url>) -> ConfigurationItem {
    ConfigurationItem {
        scope_uri: scope.cloned(),
        section: Some(CONFIG_SECTION.to_string()),
    }
}

/// Settings carried by a `didChangeConfiguration` notification, either as
/// the bare section or wrapped in `{ "amxxpawn": ... }`.
fn settings_from_notification(value: Value) -> Settings {
    let section = match value {
        Value::Object(mut map) if map.contains_key(CONFIG_SECTION) => {
            map.remove(CONFIG_SECTION).unwrap_or(Value::Null)
        }
        other => other,
    };
    Settings::from_value(section).unwrap_or_else(|e| {
        error!("Could not apply configuration: {}", e);
        Settings::default()
    })
}

#[tower_lsp::async_trait]
impl LanguageServer for AmxxLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("AMXX Pawn Language Server initializing");

        let capable = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|ws| ws.configuration)
            .unwrap_or(false);
        self.state
            .configuration_capable
            .store(capable, Ordering::Release);

        let root = workspace_root(&params);
        info!("Workspace root: {:?}", root);
        {
            let mut workspace = self.state.workspace.lock();
            workspace.set_root(root);
            if let Some(options) = params.initialization_options {
                workspace.set_settings(settings_from_notification(options));
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        will_save: None,
                        will_save_wait_until: None,
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                    },
                )),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(
                        COMPLETION_TRIGGER_CHARACTERS
                            .iter()
                            .map(|c| c.to_string())
                            .collect(),
                    ),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(
                        SIGNATURE_TRIGGER_CHARACTERS
                            .iter()
                            .map(|c| c.to_string())
                            .collect(),
                    ),
                    retrigger_characters: None,
                    work_done_progress_options: Default::default(),
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                document_link_provider: Some(DocumentLinkOptions {
                    resolve_provider: Some(false),
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "amxx-lsp".to_string(),
                version: Some(crate::VERSION.to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        info!("AMXX Pawn Language Server initialized");
        self.register_dynamic_capabilities().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("AMXX Pawn Language Server shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        info!(
            "Document opened: {} ({} bytes, {} lines)",
            doc.uri,
            doc.text.len(),
            doc.text.lines().count()
        );

        self.scheduler.cancel(&doc.uri);
        self.state.refresh_settings_if_stale(&doc.uri).await;

        let opened = self.state.workspace.lock().open(&doc.uri, &doc.text, doc.version);
        match opened {
            Ok(published) => self.state.publish(published).await,
            Err(WorkspaceError::TooLarge { size, max, .. }) => {
                error!(
                    "Document size limit exceeded on open: {} has {} bytes > {} bytes maximum",
                    doc.uri, size, max
                );
                self.state
                    .client
                    .show_message(
                        MessageType::ERROR,
                        format!(
                            "Document too large: {} bytes exceeds maximum of {} bytes ({} MB)",
                            size,
                            max,
                            max / BYTES_PER_MEGABYTE
                        ),
                    )
                    .await;
            }
            Err(e) => error!("Failed to open {}: {}", doc.uri, e),
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let Some(change) = params.content_changes.into_iter().last() else {
            warn!("Document change event for {} had no content changes", uri);
            return;
        };

        let (updated, delay) = {
            let mut workspace = self.state.workspace.lock();
            let updated = if workspace.document(&uri).is_some() {
                workspace.update(&uri, &change.text, params.text_document.version)
            } else {
                warn!("Change for unopened document {}", uri);
                return;
            };
            (updated, workspace.settings().reparse_delay())
        };

        match updated {
            Ok(true) => {
                debug!("Document {} updated, scheduling reparse in {:?}", uri, delay);
                self.scheduler.schedule(uri, delay);
            }
            Ok(false) => debug!("Document {} unchanged, skipping reparse", uri),
            Err(e) => warn!("Failed to update document {}: {}", uri, e),
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!("Document saved: {}", uri);

        if let Some(text) = params.text {
            let mut workspace = self.state.workspace.lock();
            if let Some(version) = workspace.document(&uri).map(|doc| doc.version) {
                if let Err(e) = workspace.update(&uri, &text, version) {
                    warn!("Failed to update document {} on save: {}", uri, e);
                    return;
                }
            }
        }
        self.scheduler.cancel(&uri);
        self.state.refresh_settings_if_stale(&uri).await;
        self.state.reparse_now(&uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!("Document closed: {}", uri);
        self.scheduler.cancel(&uri);
        let published = self.state.workspace.lock().close(&uri);
        self.state.publish(published).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        info!("Configuration changed");
        let settings = if self.state.configuration_capable.load(Ordering::Acquire) {
            self.state.fetch_settings(None).await
        } else {
            settings_from_notification(params.settings)
        };
        self.state.settings_stale.store(false, Ordering::Release);
        self.state.apply_settings(settings).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let mut structural = false;
        let mut published = DiagnosticsMap::new();
        {
            let mut workspace = self.state.workspace.lock();
            for change in &params.changes {
                debug!("Watched file {:?}: {}", change.typ, change.uri);
                if change.typ == FileChangeType::CHANGED {
                    published.extend(workspace.refresh_dependency(&change.uri));
                } else {
                    // Includes may now resolve to a different file.
                    structural = true;
                }
            }
            if structural {
                published.extend(workspace.reparse_all());
            }
        }
        self.state.publish(published).await;
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let location = get_definition(&self.state.workspace.lock(), uri, position);
        Ok(location.map(GotoDefinitionResponse::Scalar))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(get_hover(&self.state.workspace.lock(), uri, position))
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(get_signature_help(&self.state.workspace.lock(), uri, position))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let items = get_completions(&self.state.workspace.lock(), uri, position);
        match items {
            Some(items) => {
                debug!(
                    "Providing {} completion items for {} at {}:{}",
                    items.len(),
                    uri,
                    position.line,
                    position.character
                );
                Ok(Some(CompletionResponse::Array(items)))
            }
            None => {
                debug!("No completion available for {} (document not open)", uri);
                Ok(None)
            }
        }
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let symbols = get_document_symbols(&self.state.workspace.lock(), &params.text_document.uri);
        Ok(symbols.map(DocumentSymbolResponse::Nested))
    }

    async fn document_link(&self, params: DocumentLinkParams) -> Result<Option<Vec<DocumentLink>>> {
        Ok(get_document_links(
            &self.state.workspace.lock(),
            &params.text_document.uri,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_from_wrapped_section() {
        let settings = settings_from_notification(json!({
            "amxxpawn": { "compiler": { "includePaths": ["/opt/include"] } }
        }));
        assert_eq!(settings.compiler.include_paths, vec!["/opt/include"]);
    }

    #[test]
    fn test_settings_from_bare_section() {
        let settings = settings_from_notification(json!({
            "language": { "webApiLinks": true }
        }));
        assert!(settings.language.web_api_links);
    }

    #[test]
    fn test_settings_fallback_on_garbage() {
        assert_eq!(settings_from_notification(json!(42)), Settings::default());
        assert_eq!(settings_from_notification(Value::Null), Settings::default());
    }

    #[test]
    fn test_configuration_item_scope() {
        let uri = Url::parse("file:///ws/main.sma").unwrap();
        let item = configuration_item(Some(&uri));
        assert_eq!(item.scope_uri, Some(uri));
        assert_eq!(item.section.as_deref(), Some("amxxpawn"));
        assert_eq!(configuration_item(None).scope_uri, None);
    }

    #[test]
    #[allow(deprecated)]
    fn test_workspace_root_prefers_folders() {
        let mut params = InitializeParams {
            root_uri: Some(Url::parse("file:///legacy").unwrap()),
            ..Default::default()
        };
        assert_eq!(workspace_root(&params), Some(PathBuf::from("/legacy")));

        params.workspace_folders = Some(vec![WorkspaceFolder {
            uri: Url::parse("file:///folder").unwrap(),
            name: "folder".to_string(),
        }]);
        assert_eq!(workspace_root(&params), Some(PathBuf::from("/folder")));
    }
}
