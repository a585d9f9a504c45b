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

//! Error types for the workspace layer.
//!
//! None of these escape a reparse pass. They are logged and turned into
//! diagnostics or fallbacks at the point where they occur; the type exists so
//! the failing operations can use `?` internally.

use std::path::PathBuf;
use thiserror::Error;
use tower_lsp::lsp_types::Url;

/// Errors raised while loading documents or settings.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A dependency file could not be read (missing, unreadable, or not UTF-8).
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document is larger than the configured maximum.
    #[error("'{}' is {size} bytes, above the {max} byte limit", path.display())]
    TooLarge { path: PathBuf, size: u64, max: usize },

    /// The URI does not name a local file.
    #[error("not a file URI: {0}")]
    NotAFileUri(Url),

    /// The client sent settings that do not deserialize.
    #[error("invalid settings: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_message() {
        let err = WorkspaceError::Read {
            path: PathBuf::from("/srv/include/missing.inc"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/srv/include/missing.inc"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn test_too_large_message() {
        let err = WorkspaceError::TooLarge {
            path: PathBuf::from("big.inc"),
            size: 20,
            max: 10,
        };
        assert_eq!(err.to_string(), "'big.inc' is 20 bytes, above the 10 byte limit");
    }

    #[test]
    fn test_config_error_from_serde() {
        let serde_err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let err: WorkspaceError = serde_err.into();
        assert!(err.to_string().starts_with("invalid settings"));
    }
}
