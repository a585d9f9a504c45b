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

//! Document links to the online API reference.
//!
//! When `language.webApiLinks` is enabled, every resolved include directive
//! links to the page of that include file on the AMX Mod X API site.

use tower_lsp::lsp_types::*;

use crate::constants::{INCLUDE_EXTENSION, WEB_API_BASE_URL};
use crate::document_store::ResolvedInclusion;
use crate::workspace::Workspace;

/// Get document links, or `None` if links are disabled.
pub fn get_document_links(workspace: &Workspace, uri: &Url) -> Option<Vec<DocumentLink>> {
    if !workspace.settings().language.web_api_links {
        return None;
    }
    let doc = workspace.document(uri)?;
    Some(
        doc.data
            .resolved_inclusions
            .iter()
            .filter_map(|inclusion| {
                Some(DocumentLink {
                    range: inclusion.range,
                    target: Some(api_url(inclusion)?),
                    tooltip: None,
                    data: None,
                })
            })
            .collect(),
    )
}

/// `https://amxx-bg.info/api/<name>`, with a trailing `.inc` dropped.
fn api_url(inclusion: &ResolvedInclusion) -> Option<Url> {
    let suffix = format!(".{}", INCLUDE_EXTENSION);
    let name = inclusion
        .filename
        .strip_suffix(&suffix)
        .unwrap_or(&inclusion.filename);
    Url::parse(WEB_API_BASE_URL).ok()?.join(name).ok()
}
