// Queue Store Port (Interface)

use crate::domain::{EntryId, Location, Provider, QueueEntry, SnapshotScope};
use crate::error::Result;
use async_trait::async_trait;

/// Read filter for waiting entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryFilter {
    /// Add `notified = false` to the `status = 'waiting'` filter
    pub only_unnotified: bool,
}

impl From<SnapshotScope> for EntryFilter {
    fn from(scope: SnapshotScope) -> Self {
        Self {
            only_unnotified: scope == SnapshotScope::PendingOnly,
        }
    }
}

/// Result of the conditional mark-notified write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Row flipped from `notified = false` to `true`
    Marked,
    /// No row matched (already notified, or entry gone)
    NotMarked,
}

/// Shared queue store holding entries, providers and locations
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Waiting entries ordered by `joined_at` ascending
    async fn fetch_waiting_entries(&self, filter: EntryFilter) -> Result<Vec<QueueEntry>>;

    /// Providers with `status = 'active'`
    async fn fetch_active_providers(&self) -> Result<Vec<Provider>>;

    /// All locations with their notify configuration
    async fn fetch_locations(&self) -> Result<Vec<Location>>;

    /// Set `notified = true` for exactly one entry, only if it is still false
    async fn mark_notified(&self, id: &EntryId) -> Result<MarkOutcome>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::EntryStatus;
    use crate::error::AppError;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        entries: Vec<QueueEntry>,
        providers: Vec<Provider>,
        locations: Vec<Location>,
        fail_reads: bool,
        fail_marks: HashSet<EntryId>,
        mark_calls: Vec<EntryId>,
    }

    /// In-memory queue store for tests and local experiments
    #[derive(Default)]
    pub struct InMemoryQueueStore {
        state: Mutex<State>,
    }

    impl InMemoryQueueStore {
        pub fn new(
            entries: Vec<QueueEntry>,
            providers: Vec<Provider>,
            locations: Vec<Location>,
        ) -> Self {
            Self {
                state: Mutex::new(State {
                    entries,
                    providers,
                    locations,
                    ..Default::default()
                }),
            }
        }

        /// Make every read fail with a store error
        pub fn fail_reads(&self) {
            self.state.lock().unwrap().fail_reads = true;
        }

        /// Make `mark_notified` fail for one entry
        pub fn fail_mark_for(&self, id: impl Into<String>) {
            self.state.lock().unwrap().fail_marks.insert(id.into());
        }

        /// Simulate the queue moving on upstream (e.g. customer now being served)
        pub fn set_status(&self, id: &str, status: EntryStatus) {
            let mut state = self.state.lock().unwrap();
            if let Some(entry) = state.entries.iter_mut().find(|e| e.id == id) {
                entry.status = status;
            }
        }

        pub fn push_entry(&self, entry: QueueEntry) {
            self.state.lock().unwrap().entries.push(entry);
        }

        pub fn entry(&self, id: &str) -> Option<QueueEntry> {
            self.state
                .lock()
                .unwrap()
                .entries
                .iter()
                .find(|e| e.id == id)
                .cloned()
        }

        pub fn mark_calls(&self) -> Vec<EntryId> {
            self.state.lock().unwrap().mark_calls.clone()
        }
    }

    #[async_trait]
    impl QueueStore for InMemoryQueueStore {
        async fn fetch_waiting_entries(&self, filter: EntryFilter) -> Result<Vec<QueueEntry>> {
            let state = self.state.lock().unwrap();
            if state.fail_reads {
                return Err(AppError::Store("queue_entries unavailable".to_string()));
            }
            let mut entries: Vec<QueueEntry> = state
                .entries
                .iter()
                .filter(|e| e.is_waiting())
                .filter(|e| !filter.only_unnotified || !e.notified)
                .cloned()
                .collect();
            entries.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
            Ok(entries)
        }

        async fn fetch_active_providers(&self) -> Result<Vec<Provider>> {
            let state = self.state.lock().unwrap();
            if state.fail_reads {
                return Err(AppError::Store("barbers unavailable".to_string()));
            }
            Ok(state
                .providers
                .iter()
                .filter(|p| p.is_active())
                .cloned()
                .collect())
        }

        async fn fetch_locations(&self) -> Result<Vec<Location>> {
            let state = self.state.lock().unwrap();
            if state.fail_reads {
                return Err(AppError::Store("barbershops unavailable".to_string()));
            }
            Ok(state.locations.clone())
        }

        async fn mark_notified(&self, id: &EntryId) -> Result<MarkOutcome> {
            let mut state = self.state.lock().unwrap();
            state.mark_calls.push(id.clone());
            if state.fail_marks.contains(id) {
                return Err(AppError::Store(format!("update rejected for {}", id)));
            }
            match state.entries.iter_mut().find(|e| &e.id == id && !e.notified) {
                Some(entry) => {
                    entry.notified = true;
                    Ok(MarkOutcome::Marked)
                }
                None => Ok(MarkOutcome::NotMarked),
            }
        }
    }
}
