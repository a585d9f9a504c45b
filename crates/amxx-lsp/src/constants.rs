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

//! LSP constants and engine limits.
//!
//! # Organization
//!
//! Constants are organized by category:
//! - **Performance Tuning**: Debounce delays
//! - **Memory Limits**: Document size and include depth
//! - **LSP Protocol**: Configuration section, diagnostic source, trigger characters
//! - **Include Resolution**: File extension and web API links

// ============================================================================
// Performance Tuning
// ============================================================================

/// Default debounce delay between the last edit and the reparse (in milliseconds).
///
/// Rapid keystrokes on the same document collapse into one pending reparse.
/// Clients may override it through `language.reparseDelay`.
pub const DEBOUNCE_MS: u64 = 200;

// ============================================================================
// Memory Limits
// ============================================================================

/// Bytes per megabyte (1024 * 1024).
pub const BYTES_PER_MEGABYTE: usize = 1024 * 1024;

/// Default maximum size of an open document or include file (16 MB).
///
/// Plugin sources and include headers are rarely above a few hundred
/// kilobytes; anything near this limit is almost certainly not Pawn.
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * BYTES_PER_MEGABYTE;

/// Maximum include nesting followed from an open document.
///
/// Cycles are already cut by the per-pass visited set; this bounds chains of
/// distinct files (for example generated headers including each other).
pub const MAX_INCLUDE_DEPTH: usize = 64;

// ============================================================================
// LSP Protocol Constants
// ============================================================================

/// Section requested through `workspace/configuration`.
pub const CONFIG_SECTION: &str = "amxxpawn";

/// `source` attached to every published diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "amxxpawn";

/// Characters that trigger completion.
pub const COMPLETION_TRIGGER_CHARACTERS: &[&str] = &["(", ",", "=", "@"];

/// Characters that trigger signature help.
pub const SIGNATURE_TRIGGER_CHARACTERS: &[&str] = &["(", ","];

/// Lines above the cursor searched for an unclosed call in signature help.
pub const SIGNATURE_LOOKBACK_LINES: u32 = 16;

// ============================================================================
// Include Resolution
// ============================================================================

/// Extension tried when an include names a file without one.
pub const INCLUDE_EXTENSION: &str = "inc";

/// Base URL of the AMX Mod X API reference used for document links.
pub const WEB_API_BASE_URL: &str = "https://amxx-bg.info/api/";
