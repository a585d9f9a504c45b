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

//! Debounced reparse scheduling.
//!
//! Each document has at most one pending reparse. Scheduling again before
//! the delay expires aborts the pending task and starts a new one, so a
//! burst of edits collapses into a single reparse of the latest text. Once a
//! task's delay has elapsed it takes itself out of the pending map and runs
//! to completion; it can no longer be cancelled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tower_lsp::lsp_types::Url;
use tracing::debug;

/// Work run when a document's debounce delay expires.
#[tower_lsp::async_trait]
pub trait ReparseHandler: Send + Sync + 'static {
    async fn reparse(&self, uri: Url);
}

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Per-document debounce timers.
pub struct ReparseScheduler<H> {
    handler: Arc<H>,
    pending: Arc<DashMap<Url, Pending>>,
    next_generation: AtomicU64,
}

impl<H: ReparseHandler> ReparseScheduler<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            pending: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Schedules a reparse of `uri` after `delay`, replacing any pending one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, uri: Url, delay: Duration) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        // The entry stays locked until the new task is recorded, so the task
        // cannot look itself up before it is there.
        let entry = self.pending.entry(uri.clone());
        let pending = Arc::clone(&self.pending);
        let handler = Arc::clone(&self.handler);
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let started = pending
                .remove_if(&uri, |_, p| p.generation == generation)
                .is_some();
            if started {
                handler.reparse(uri).await;
            }
        });

        let task = Pending { generation, handle };
        match entry {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.insert(task);
                previous.handle.abort();
                debug!("Rescheduled reparse of {}", occupied.key());
            }
            Entry::Vacant(vacant) => {
                vacant.insert(task);
            }
        }
    }

    /// Cancels the pending reparse of `uri`, if any.
    ///
    /// Returns `true` if a pending reparse was cancelled. A reparse whose
    /// delay already elapsed is not affected.
    pub fn cancel(&self, uri: &Url) -> bool {
        match self.pending.remove(uri) {
            Some((_, pending)) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, uri: &Url) -> bool {
        self.pending.contains_key(uri)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl<H> Drop for ReparseScheduler<H> {
    fn drop(&mut self) {
        for entry in self.pending.iter() {
            entry.value().handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        runs: Mutex<Vec<Url>>,
    }

    #[tower_lsp::async_trait]
    impl ReparseHandler for Recorder {
        async fn reparse(&self, uri: Url) {
            self.runs.lock().push(uri);
        }
    }

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///ws/{}", name)).unwrap()
    }

    const DELAY: Duration = Duration::from_millis(30);
    const SETTLE: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn test_burst_collapses_into_one_reparse() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = ReparseScheduler::new(Arc::clone(&recorder));
        for _ in 0..5 {
            scheduler.schedule(uri("a.sma"), DELAY);
        }
        assert!(scheduler.is_pending(&uri("a.sma")));
        assert_eq!(scheduler.pending_count(), 1);

        sleep(SETTLE).await;
        assert_eq!(*recorder.runs.lock(), vec![uri("a.sma")]);
        assert!(!scheduler.is_pending(&uri("a.sma")));
    }

    #[tokio::test]
    async fn test_cancel_prevents_reparse() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = ReparseScheduler::new(Arc::clone(&recorder));
        scheduler.schedule(uri("a.sma"), DELAY);
        assert!(scheduler.cancel(&uri("a.sma")));
        assert!(!scheduler.cancel(&uri("a.sma")));

        sleep(SETTLE).await;
        assert!(recorder.runs.lock().is_empty());
    }

    #[tokio::test]
    async fn test_documents_are_independent() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = ReparseScheduler::new(Arc::clone(&recorder));
        scheduler.schedule(uri("a.sma"), DELAY);
        scheduler.schedule(uri("b.sma"), DELAY);
        scheduler.schedule(uri("a.sma"), DELAY);

        sleep(SETTLE).await;
        let mut runs = recorder.runs.lock().clone();
        runs.sort();
        assert_eq!(runs, vec![uri("a.sma"), uri("b.sma")]);
    }

    #[tokio::test]
    async fn test_zero_delay_still_runs() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = ReparseScheduler::new(Arc::clone(&recorder));
        scheduler.schedule(uri("a.sma"), Duration::ZERO);

        sleep(SETTLE).await;
        assert_eq!(recorder.runs.lock().len(), 1);
    }
}
