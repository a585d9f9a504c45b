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

//! Client settings for the `amxxpawn` configuration section.
//!
//! ```json
//! {
//!   "compiler": { "includePaths": ["${workspaceFolder}/include"] },
//!   "language": { "webApiLinks": true, "reparseDelay": 200 }
//! }
//! ```
//!
//! Every field is optional. Settings the engine does not use (compiler
//! executable, output path and so on) are accepted and ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEBOUNCE_MS;
use crate::error::WorkspaceResult;

/// Settings fetched from the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub compiler: CompilerSettings,
    pub language: LanguageSettings,
}

/// Compiler-related settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerSettings {
    /// Include search directories, in search order. May contain
    /// `${workspaceFolder}`, `${workspaceRoot}` and `${fileDirname}`.
    pub include_paths: Vec<String>,
}

/// Editor-behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageSettings {
    /// Produce document links from include directives to the online API reference.
    pub web_api_links: bool,
    /// Debounce delay for reparsing after an edit, in milliseconds.
    pub reparse_delay: u64,
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            web_api_links: false,
            reparse_delay: DEBOUNCE_MS,
        }
    }
}

impl Settings {
    /// Deserializes the value returned by `workspace/configuration`.
    ///
    /// `null` (section not set at all) yields the defaults.
    pub fn from_value(value: serde_json::Value) -> WorkspaceResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Debounce delay between an edit and its reparse.
    pub fn reparse_delay(&self) -> Duration {
        Duration::from_millis(self.language.reparse_delay)
    }

    /// Include search directories for a document, with variables expanded.
    ///
    /// Entries whose variables cannot be expanded (unknown variable, no
    /// workspace open, document not on disk) are skipped.
    pub fn search_paths_for(
        &self,
        workspace_root: Option<&Path>,
        document: Option<&Path>,
    ) -> Vec<PathBuf> {
        self.compiler
            .include_paths
            .iter()
            .filter_map(|raw| expand_path_variables(raw, workspace_root, document))
            .collect()
    }
}

/// Expands path variables in `raw`.
///
/// Relative results are joined to the workspace root when there is one.
///
/// # Example
///
/// ```
/// use amxx_lsp::config::expand_path_variables;
/// use std::path::Path;
///
/// let root = Path::new("/home/me/plugins");
/// let path = expand_path_variables("${workspaceFolder}/include", Some(root), None);
/// assert_eq!(path.unwrap(), Path::new("/home/me/plugins/include"));
///
/// // No document to take the directory from.
/// assert!(expand_path_variables("${fileDirname}/inc", Some(root), None).is_none());
/// ```
pub fn expand_path_variables(
    raw: &str,
    workspace_root: Option<&Path>,
    document: Option<&Path>,
) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut expanded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find("${") {
        expanded.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let close = after.find('}')?;
        let value = match &after[..close] {
            "workspaceFolder" | "workspaceRoot" => workspace_root?.to_str()?,
            "fileDirname" => document?.parent()?.to_str()?,
            _ => return None,
        };
        expanded.push_str(value);
        rest = &after[close + 1..];
    }
    expanded.push_str(rest);

    let path = PathBuf::from(expanded);
    match workspace_root {
        Some(root) if path.is_relative() => Some(root.join(path)),
        _ => Some(path),
    }
}
