use std::collections::VecDeque;

use msgscope_types::{SeqId, Severity};

/// One displayed record and the handle of its view entry
#[derive(Clone, Debug)]
pub struct ViewEntry<H> {
    pub id: SeqId,
    pub severity: Severity,
    pub handle: H,
}

/// Displayed records in ascending sequence order
#[derive(Debug)]
pub struct ActiveViewIndex<H> {
    entries: VecDeque<ViewEntry<H>>,
}

impl<H> Default for ActiveViewIndex<H> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<H> ActiveViewIndex<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(pos)` if `id` is present, otherwise `Err(pos)` with the position of
    /// the first entry whose id is greater (or the length if none is)
    pub fn locate(&self, id: SeqId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |entry| entry.id)
    }

    /// Insert at a position returned by `locate`
    pub fn insert_at(&mut self, pos: usize, entry: ViewEntry<H>) {
        debug_assert!(pos == 0 || self.entries[pos - 1].id < entry.id);
        debug_assert!(pos == self.entries.len() || entry.id < self.entries[pos].id);
        self.entries.insert(pos, entry);
    }

    /// Handle of the entry at a position
    pub fn handle_at(&self, pos: usize) -> Option<&H> {
        self.entries.get(pos).map(|entry| &entry.handle)
    }

    pub fn get(&self, id: SeqId) -> Option<&ViewEntry<H>> {
        self.locate(id).ok().map(|pos| &self.entries[pos])
    }

    pub fn contains(&self, id: SeqId) -> bool {
        self.locate(id).is_ok()
    }

    pub fn remove(&mut self, id: SeqId) -> Option<ViewEntry<H>> {
        let pos = self.locate(id).ok()?;
        self.entries.remove(pos)
    }

    /// Remove the entry with the lowest id
    pub fn pop_oldest(&mut self) -> Option<ViewEntry<H>> {
        self.entries.pop_front()
    }

    /// Remove every entry of one severity, preserving the order of the rest
    pub fn drain_severity(&mut self, severity: Severity) -> Vec<ViewEntry<H>> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.severity == severity);
        self.entries = kept.into();
        removed
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ViewEntry<H>> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<SeqId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
