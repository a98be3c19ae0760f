use std::collections::VecDeque;

use msgscope_types::{SeqId, Severity, Visibility};

use crate::config::ConsoleConfig;

/// Bounded history of one severity, oldest first
#[derive(Clone, Debug)]
pub struct SeverityStore {
    /// Record ids in sequence order
    ids: VecDeque<SeqId>,

    /// Maximum retained count
    capacity: usize,
}

impl SeverityStore {
    /// Create a new store with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an id, returning the evicted oldest id if over capacity
    pub fn push(&mut self, id: SeqId) -> Option<SeqId> {
        debug_assert!(
            self.ids.back().is_none_or(|last| *last < id),
            "store ids out of order"
        );
        self.ids.push_back(id);
        if self.ids.len() > self.capacity {
            self.ids.pop_front()
        } else {
            None
        }
    }

    /// Remove one id by identity. Returns false if it was not retained.
    pub fn remove(&mut self, id: SeqId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(pos) => {
                self.ids.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, id: SeqId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Ids oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = SeqId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// One severity class: its store, visibility and counters
#[derive(Clone, Debug)]
pub(crate) struct Lane {
    pub store: SeverityStore,
    pub visible: bool,
    pub evicted: u64,
}

/// Severity-indexed table of lanes
pub(crate) struct LaneTable {
    lanes: [Lane; 4],
}

impl LaneTable {
    pub fn new(config: &ConsoleConfig) -> Self {
        let lane = |severity: Severity| Lane {
            store: SeverityStore::new(config.capacity_for(severity)),
            visible: config.visible.get(severity),
            evicted: 0,
        };
        Self {
            lanes: Severity::RETAINED.map(lane),
        }
    }

    pub fn get(&self, severity: Severity) -> Option<&Lane> {
        severity.lane().map(|i| &self.lanes[i])
    }

    pub fn get_mut(&mut self, severity: Severity) -> Option<&mut Lane> {
        severity.lane().map(|i| &mut self.lanes[i])
    }

    pub fn is_visible(&self, severity: Severity) -> bool {
        self.get(severity).is_some_and(|lane| lane.visible)
    }

    pub fn visibility(&self) -> Visibility {
        let mut visibility = Visibility::none();
        for severity in Severity::RETAINED {
            visibility.set(severity, self.is_visible(severity));
        }
        visibility
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_keeps_most_recent() {
        let mut store = SeverityStore::new(3);
        let mut evicted = Vec::new();
        for id in 0..5 {
            if let Some(old) = store.push(SeqId(id)) {
                evicted.push(old);
            }
        }

        assert_eq!(store.len(), 3);
        assert_eq!(
            store.iter().collect::<Vec<_>>(),
            vec![SeqId(2), SeqId(3), SeqId(4)]
        );
        assert_eq!(evicted, vec![SeqId(0), SeqId(1)]);
    }

    #[test]
    fn test_remove_by_identity() {
        let mut store = SeverityStore::new(10);
        for id in [1, 4, 9] {
            store.push(SeqId(id));
        }

        assert!(store.remove(SeqId(4)));
        assert!(!store.remove(SeqId(4)));
        assert!(!store.contains(SeqId(4)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_lane_table_follows_config() {
        let mut config = ConsoleConfig::default();
        config.visible.warning = false;
        config.retention.critical = Some(7);

        let table = LaneTable::new(&config);
        assert!(!table.is_visible(Severity::Warning));
        assert!(table.is_visible(Severity::Debug));
        assert!(!table.is_visible(Severity::Fatal));
        assert_eq!(table.get(Severity::Critical).unwrap().store.capacity(), 7);
        assert!(table.get(Severity::Fatal).is_none());
    }
}
