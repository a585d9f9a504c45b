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

//! Include path resolution.
//!
//! An include is looked up in the requesting file's own directory (local
//! includes only) and then in each configured search directory, in order.
//! In every directory the exact name is tried before the name with `.inc`
//! appended. The first readable regular file wins.
//!
//! Resolution is purely filesystem-based: documents open in the editor are
//! not consulted, and the result is lexically normalized (`.` and `..`
//! removed) but not canonicalized, so symlinked include trees keep the paths
//! the editor uses.

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use tower_lsp::lsp_types::Url;
use tracing::trace;

use crate::constants::INCLUDE_EXTENSION;
use crate::error::{WorkspaceError, WorkspaceResult};

/// Maps include file names to files on disk.
#[derive(Debug, Clone, Default)]
pub struct IncludeResolver {
    search_dirs: Vec<PathBuf>,
}

impl IncludeResolver {
    /// Creates a resolver over already-expanded search directories.
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    /// Configured search directories, in search order.
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Resolves `filename` as included from `requesting`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use amxx_lsp::resolver::IncludeResolver;
    /// use std::path::{Path, PathBuf};
    ///
    /// let resolver = IncludeResolver::new(vec![PathBuf::from("/opt/amxx/include")]);
    /// // Finds /opt/amxx/include/amxmodx.inc
    /// let path = resolver.resolve("amxmodx", false, Path::new("/src/plugin.sma"));
    /// ```
    pub fn resolve(&self, filename: &str, is_local: bool, requesting: &Path) -> Option<PathBuf> {
        let local_dir = if is_local { requesting.parent() } else { None };
        let with_extension = format!("{}.{}", filename, INCLUDE_EXTENSION);

        for dir in local_dir.into_iter().chain(self.search_dirs.iter().map(PathBuf::as_path)) {
            for candidate in [dir.join(filename), dir.join(&with_extension)] {
                if is_readable_file(&candidate) {
                    trace!("Resolved include '{}' to {}", filename, candidate.display());
                    return Some(normalize_path(&candidate));
                }
            }
        }
        None
    }
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

/// Removes `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }
    components.iter().collect()
}

/// Converts a `file://` URI to a local path.
pub fn uri_to_path(uri: &Url) -> WorkspaceResult<PathBuf> {
    uri.to_file_path()
        .map_err(|()| WorkspaceError::NotAFileUri(uri.clone()))
}

/// Converts an absolute path to a `file://` URI.
pub fn path_to_uri(path: &Path) -> Option<Url> {
    Url::from_file_path(path).ok()
}
