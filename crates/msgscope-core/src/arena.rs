use std::collections::BTreeMap;

use msgscope_types::{MessageRecord, SeqId};

/// A record plus the structures still referring to it
struct Slot {
    record: MessageRecord,
    /// Still held by its severity store
    retained: bool,
    /// Materialized, or about to be materialized, in the displayed list
    displayed: bool,
}

impl Slot {
    fn is_live(&self) -> bool {
        self.retained || self.displayed
    }
}

/// Owner of every live record, keyed by sequence id.
///
/// Stores and the view index hold ids only. A record is dropped once it is
/// neither retained by its store nor displayed.
#[derive(Default)]
pub(crate) struct RecordArena {
    slots: BTreeMap<SeqId, Slot>,
}

impl RecordArena {
    pub fn insert(&mut self, record: MessageRecord, displayed: bool) {
        let id = record.id();
        let previous = self.slots.insert(
            id,
            Slot {
                record,
                retained: true,
                displayed,
            },
        );
        debug_assert!(previous.is_none(), "sequence id {id} allocated twice");
    }

    pub fn get(&self, id: SeqId) -> Option<&MessageRecord> {
        self.slots.get(&id).map(|slot| &slot.record)
    }

    /// Mark a record as displayed. Returns false if it no longer exists.
    pub fn pin_display(&mut self, id: SeqId) -> bool {
        match self.slots.get_mut(&id) {
            Some(slot) => {
                slot.displayed = true;
                true
            }
            None => false,
        }
    }

    /// Whether a record is marked displayed
    #[cfg(test)]
    pub fn is_displayed(&self, id: SeqId) -> bool {
        self.slots.get(&id).is_some_and(|slot| slot.displayed)
    }

    /// The displayed list no longer refers to this record
    pub fn release_display(&mut self, id: SeqId) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.displayed = false;
            self.collect(id);
        }
    }

    /// The severity store no longer refers to this record
    pub fn release_retention(&mut self, id: SeqId) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.retained = false;
            self.collect(id);
        }
    }

    /// Drop a record regardless of who refers to it
    pub fn discard(&mut self, id: SeqId) -> Option<MessageRecord> {
        self.slots.remove(&id).map(|slot| slot.record)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    fn collect(&mut self, id: SeqId) {
        if self.slots.get(&id).is_some_and(|slot| !slot.is_live()) {
            self.slots.remove(&id);
        }
    }
}
