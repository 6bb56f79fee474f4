// Queue Snapshot - read-only view for one evaluation pass

use super::entry::{EntryId, QueueEntry};
use super::location::{Location, LocationId};
use super::provider::Provider;
use std::collections::{BTreeMap, HashSet};

/// Which waiting entries a snapshot carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotScope {
    /// Only entries with `notified = false` (store-side filter)
    #[default]
    PendingOnly,
    /// Already-notified waiting entries too, kept for position context
    WithNotified,
}

/// Non-fatal problem found while assembling a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotAnomaly {
    /// Entry references a location missing from the fetched set
    UnknownLocation {
        entry_id: EntryId,
        location_id: LocationId,
    },
    /// Store returned an entry that is not `waiting`
    NotWaiting { entry_id: EntryId, status: String },
    /// Same entry id returned twice; only the first is kept
    DuplicateEntry { entry_id: EntryId },
}

impl std::fmt::Display for SnapshotAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotAnomaly::UnknownLocation {
                entry_id,
                location_id,
            } => write!(f, "entry {} references unknown location {}", entry_id, location_id),
            SnapshotAnomaly::NotWaiting { entry_id, status } => {
                write!(f, "entry {} is not waiting (status {})", entry_id, status)
            }
            SnapshotAnomaly::DuplicateEntry { entry_id } => {
                write!(f, "entry {} returned more than once", entry_id)
            }
        }
    }
}

/// One location's queue, as seen by the policy engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQueue {
    pub location: Location,
    pub active_providers: usize,
    /// Waiting entries in FIFO order
    pub entries: Vec<QueueEntry>,
}

impl LocationQueue {
    pub fn new(location: Location, active_providers: usize, mut entries: Vec<QueueEntry>) -> Self {
        entries.sort_by(|a, b| a.fifo_key().cmp(&b.fifo_key()));
        Self {
            location,
            active_providers,
            entries,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.notified).count()
    }
}

/// Immutable input of one pass
#[derive(Debug, Clone, Default)]
pub struct QueueSnapshot {
    pub scope: SnapshotScope,
    pub locations: BTreeMap<LocationId, LocationQueue>,
    pub anomalies: Vec<SnapshotAnomaly>,
}

impl QueueSnapshot {
    /// Group fetched rows by location.
    ///
    /// Only locations with at least one entry get a `LocationQueue`. Active
    /// providers are counted per location; inactive ones are ignored.
    pub fn assemble(
        scope: SnapshotScope,
        entries: Vec<QueueEntry>,
        providers: &[Provider],
        locations: Vec<Location>,
    ) -> Self {
        let locations: BTreeMap<LocationId, Location> =
            locations.into_iter().map(|l| (l.id.clone(), l)).collect();

        let mut active_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for provider in providers.iter().filter(|p| p.is_active()) {
            *active_counts.entry(provider.location_id.as_str()).or_default() += 1;
        }

        let mut anomalies = Vec::new();
        let mut seen: HashSet<EntryId> = HashSet::new();
        let mut grouped: BTreeMap<LocationId, Vec<QueueEntry>> = BTreeMap::new();

        for entry in entries {
            if !seen.insert(entry.id.clone()) {
                anomalies.push(SnapshotAnomaly::DuplicateEntry { entry_id: entry.id });
                continue;
            }
            if !entry.is_waiting() {
                anomalies.push(SnapshotAnomaly::NotWaiting {
                    status: entry.status.to_string(),
                    entry_id: entry.id,
                });
                continue;
            }
            if scope == SnapshotScope::PendingOnly && entry.notified {
                continue;
            }
            if !locations.contains_key(&entry.location_id) {
                anomalies.push(SnapshotAnomaly::UnknownLocation {
                    entry_id: entry.id,
                    location_id: entry.location_id,
                });
                continue;
            }
            grouped
                .entry(entry.location_id.clone())
                .or_default()
                .push(entry);
        }

        let locations = grouped
            .into_iter()
            .filter_map(|(location_id, entries)| {
                let location = locations.get(&location_id)?.clone();
                let active = active_counts.get(location_id.as_str()).copied().unwrap_or(0);
                Some((location_id, LocationQueue::new(location, active, entries)))
            })
            .collect();

        Self {
            scope,
            locations,
            anomalies,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.locations.values().map(|q| q.entries.len()).sum()
    }
}
