use std::sync::Arc;

use tracing::debug;

use msgscope_types::{MessageRecord, SeqId, Severity};

use crate::engine::{Console, ViewRequest, ViewRequests};
use crate::index::{ActiveViewIndex, ViewEntry};

/// The visual list the console drives.
///
/// Implementations create one view entry per displayed record and hand back
/// a handle the console uses to position or delete it later.
pub trait ViewSink {
    type Handle;

    /// Create an entry at the end of the list
    fn append(&mut self, record: &MessageRecord) -> Self::Handle;

    /// Create an entry immediately before `anchor`
    fn insert_before(&mut self, anchor: &Self::Handle, record: &MessageRecord) -> Self::Handle;

    /// Delete an entry
    fn remove(&mut self, handle: Self::Handle);
}

/// Owner of the displayed list. Lives on the one context that may touch the view.
///
/// Keeps the displayed entries in ascending sequence order while severities
/// are shown and hidden independently, and keeps the list within
/// `max_displayed`.
pub struct ConsoleView<S: ViewSink> {
    console: Arc<Console>,
    sink: S,
    index: ActiveViewIndex<S::Handle>,
    max_displayed: usize,
}

impl<S: ViewSink> ConsoleView<S> {
    pub fn new(console: Arc<Console>, sink: S) -> Self {
        let max_displayed = console.config().max_displayed;
        Self {
            console,
            sink,
            index: ActiveViewIndex::new(),
            max_displayed,
        }
    }

    /// Apply one request from the producer queue
    pub fn apply(&mut self, request: ViewRequest) {
        match request {
            ViewRequest::Materialize(id) => {
                let Some(record) = self.console.materialize(id) else {
                    return;
                };
                self.place(&record);
                self.trim();
            }
        }
    }

    /// Apply every queued request. Returns how many were applied.
    pub fn drain(&mut self, requests: &mut ViewRequests) -> usize {
        let mut applied = 0;
        while let Some(request) = requests.try_recv() {
            self.apply(request);
            applied += 1;
        }
        applied
    }

    /// Show a severity: merge its retained records into the list by sequence
    /// id, oldest first, while the list has room. Returns how many were added.
    pub fn enable(&mut self, severity: Severity) -> usize {
        let room = self.max_displayed.saturating_sub(self.index.len());
        let Some(records) = self.console.show(severity, room) else {
            return 0;
        };

        // `show` returns at most `room` records, so the cap holds
        let mut added = 0;
        for record in &records {
            if self.place(record) {
                added += 1;
            }
        }

        debug!(%severity, added, "severity shown");
        added
    }

    /// Hide a severity: delete all of its entries. Retained records are kept.
    pub fn disable(&mut self, severity: Severity) -> usize {
        if !self.console.hide(severity) {
            return 0;
        }

        let removed = self.index.drain_severity(severity);
        let ids: Vec<SeqId> = removed.iter().map(|entry| entry.id).collect();
        for entry in removed {
            self.sink.remove(entry.handle);
        }
        self.console.release_view(&ids);

        debug!(%severity, removed = ids.len(), "severity hidden");
        ids.len()
    }

    /// Flip a severity. Returns whether it is now shown.
    pub fn toggle(&mut self, severity: Severity) -> bool {
        if self.is_visible(severity) {
            self.disable(severity);
            false
        } else {
            self.enable(severity);
            self.is_visible(severity)
        }
    }

    pub fn is_visible(&self, severity: Severity) -> bool {
        self.console.is_visible(severity)
    }

    /// Delete one record from the list and from its store. Removing a record
    /// that is already gone does nothing. Returns whether anything was removed.
    pub fn remove(&mut self, id: SeqId) -> bool {
        let displayed = match self.index.remove(id) {
            Some(entry) => {
                self.sink.remove(entry.handle);
                true
            }
            None => false,
        };
        let discarded = self.console.discard(id);
        displayed || discarded
    }

    /// Displayed entries, oldest first
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &ViewEntry<S::Handle>> + ExactSizeIterator {
        self.index.iter()
    }

    pub fn ids(&self) -> Vec<SeqId> {
        self.index.ids()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn max_displayed(&self) -> usize {
        self.max_displayed
    }

    pub fn console(&self) -> &Arc<Console> {
        &self.console
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Create the view entry for a record at its sequence position.
    /// Returns false if it is already displayed.
    fn place(&mut self, record: &MessageRecord) -> bool {
        let pos = match self.index.locate(record.id()) {
            Ok(_) => return false,
            Err(pos) => pos,
        };

        let handle = match self.index.handle_at(pos) {
            Some(anchor) => self.sink.insert_before(anchor, record),
            None => self.sink.append(record),
        };
        self.index.insert_at(
            pos,
            ViewEntry {
                id: record.id(),
                severity: record.severity(),
                handle,
            },
        );
        true
    }

    /// Drop the oldest entries while over the display cap
    fn trim(&mut self) {
        let mut dropped = Vec::new();
        while self.index.len() > self.max_displayed {
            let Some(entry) = self.index.pop_oldest() else {
                break;
            };
            dropped.push(entry.id);
            self.sink.remove(entry.handle);
        }
        self.console.release_view(&dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use crate::testing::{RecordingSink, SinkOp, console_with_buf};
    use msgscope_types::Provenance;

    fn ids(raw: &[u64]) -> Vec<SeqId> {
        raw.iter().copied().map(SeqId).collect()
    }

    fn setup(config: ConsoleConfig) -> (ConsoleView<RecordingSink>, ViewRequests) {
        let (console, requests, _buf) = console_with_buf(config);
        (ConsoleView::new(console, RecordingSink::default()), requests)
    }

    fn log(view: &ConsoleView<RecordingSink>, severity: Severity) {
        view.console()
            .record(severity, Provenance::new("view.rs", 0), severity.as_str());
    }

    #[test]
    fn test_requests_materialize_in_order() {
        let (mut view, mut requests) = setup(ConsoleConfig::default());
        log(&view, Severity::Info);
        log(&view, Severity::Warning);
        log(&view, Severity::Debug);

        assert_eq!(view.drain(&mut requests), 3);
        assert_eq!(view.ids(), ids(&[0, 1, 2]));
        assert_eq!(
            view.sink().ops,
            vec![
                SinkOp::Append(SeqId(0)),
                SinkOp::Append(SeqId(1)),
                SinkOp::Append(SeqId(2))
            ]
        );
    }

    #[test]
    fn test_enable_merges_by_sequence_id() {
        let mut config = ConsoleConfig::default();
        config.visible.info = false;
        let (mut view, mut requests) = setup(config);

        // Warnings land on 1, 3, 5 and infos on 2, 4
        log(&view, Severity::Critical);
        for severity in [
            Severity::Warning,
            Severity::Info,
            Severity::Warning,
            Severity::Info,
            Severity::Warning,
        ] {
            log(&view, severity);
        }
        view.drain(&mut requests);
        view.remove(SeqId(0));
        assert_eq!(view.ids(), ids(&[1, 3, 5]));

        assert_eq!(view.enable(Severity::Info), 2);
        assert_eq!(view.ids(), ids(&[1, 2, 3, 4, 5]));
        assert!(view.sink().ops.contains(&SinkOp::InsertBefore {
            anchor: SeqId(5),
            id: SeqId(4)
        }));
        assert!(view.sink().ops.contains(&SinkOp::InsertBefore {
            anchor: SeqId(3),
            id: SeqId(2)
        }));
    }

    #[test]
    fn test_disable_then_enable_restores_order() {
        let (mut view, mut requests) = setup(ConsoleConfig::default());
        for i in 0..12 {
            log(&view, Severity::RETAINED[i % 4]);
        }
        view.drain(&mut requests);
        let before = view.ids();

        assert_eq!(view.disable(Severity::Info), 3);
        assert_eq!(view.disable(Severity::Warning), 3);
        assert_eq!(view.ids(), ids(&[0, 3, 4, 7, 8, 11]));

        view.enable(Severity::Info);
        view.enable(Severity::Warning);
        assert_eq!(view.ids(), before);

        // Retained history is untouched by hiding
        assert_eq!(view.console().retained_ids(Severity::Info).len(), 3);
    }

    #[test]
    fn test_disable_is_a_no_op_when_hidden() {
        let (mut view, _requests) = setup(ConsoleConfig::default());
        assert_eq!(view.disable(Severity::Debug), 0);
        assert_eq!(view.disable(Severity::Debug), 0);
        assert!(!view.is_visible(Severity::Debug));
        assert_eq!(view.enable(Severity::Debug), 0);
        assert_eq!(view.enable(Severity::Debug), 0);
        assert!(view.is_visible(Severity::Debug));
    }

    #[test]
    fn test_display_cap_drops_lowest_id() {
        let config = ConsoleConfig {
            max_displayed: 3,
            ..Default::default()
        };
        let (mut view, mut requests) = setup(config);
        for i in 0..5 {
            log(&view, Severity::RETAINED[i % 2]);
        }
        view.drain(&mut requests);

        assert_eq!(view.ids(), ids(&[2, 3, 4]));
        assert!(view.sink().ops.contains(&SinkOp::Remove(SeqId(0))));
        assert!(view.sink().ops.contains(&SinkOp::Remove(SeqId(1))));
        // Evicted from the view, not from the stores
        assert_eq!(view.console().retained_ids(Severity::Debug), ids(&[0, 2, 4]));
    }

    #[test]
    fn test_enable_respects_display_cap() {
        let mut config = ConsoleConfig {
            max_displayed: 4,
            ..Default::default()
        };
        config.visible.debug = false;
        let (mut view, mut requests) = setup(config);

        log(&view, Severity::Info);
        log(&view, Severity::Info);
        for _ in 0..5 {
            log(&view, Severity::Debug);
        }
        view.drain(&mut requests);
        assert_eq!(view.ids(), ids(&[0, 1]));

        assert_eq!(view.enable(Severity::Debug), 2);
        assert_eq!(view.len(), 4);
        // Retained records are added in sequence order until the list is full
        assert_eq!(view.ids(), ids(&[0, 1, 2, 3]));

        view.disable(Severity::Info);
        view.disable(Severity::Debug);
        assert_eq!(view.enable(Severity::Debug), 4);
        assert_eq!(view.ids(), ids(&[2, 3, 4, 5]));
    }

    #[test]
    fn test_removed_record_not_resurrected() {
        let (mut view, mut requests) = setup(ConsoleConfig::default());
        for _ in 0..3 {
            log(&view, Severity::Warning);
        }
        view.drain(&mut requests);

        assert!(view.remove(SeqId(1)));
        assert!(!view.remove(SeqId(1)));
        assert_eq!(view.ids(), ids(&[0, 2]));
        assert_eq!(view.console().retained_ids(Severity::Warning), ids(&[0, 2]));

        view.disable(Severity::Warning);
        view.enable(Severity::Warning);
        assert_eq!(view.ids(), ids(&[0, 2]));
    }

    #[test]
    fn test_request_for_hidden_severity_is_dropped() {
        let (mut view, mut requests) = setup(ConsoleConfig::default());
        log(&view, Severity::Critical);

        // Hidden after dispatch but before the view saw the request
        view.disable(Severity::Critical);
        view.drain(&mut requests);
        assert!(view.is_empty());
        assert_eq!(view.console().stats().live_records, 1);

        view.enable(Severity::Critical);
        assert_eq!(view.ids(), ids(&[0]));
    }

    #[test]
    fn test_stale_request_after_reenable_is_not_duplicated() {
        let (mut view, mut requests) = setup(ConsoleConfig::default());
        log(&view, Severity::Info);

        view.disable(Severity::Info);
        view.enable(Severity::Info);
        view.drain(&mut requests);

        assert_eq!(view.ids(), ids(&[0]));
        assert_eq!(view.sink().ops, vec![SinkOp::Append(SeqId(0))]);
    }

    #[test]
    fn test_records_freed_after_store_and_view_release_them() {
        let config = ConsoleConfig {
            max_displayed: 2,
            max_retained: 2,
            ..Default::default()
        };
        let (mut view, mut requests) = setup(config);
        for _ in 0..6 {
            log(&view, Severity::Info);
        }
        view.drain(&mut requests);

        assert_eq!(view.ids(), ids(&[4, 5]));
        assert_eq!(view.console().stats().live_records, 2);
    }

    #[test]
    fn test_list_stays_sorted_under_random_toggles() {
        let config = ConsoleConfig {
            max_displayed: 25,
            max_retained: 10,
            ..Default::default()
        };
        let (mut view, mut requests) = setup(config);

        // Deterministic pseudo-random walk over ingest and toggle steps
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let severity = Severity::RETAINED[(seed % 4) as usize];
            match (seed >> 8) % 5 {
                0 => {
                    view.toggle(severity);
                }
                1 => {
                    if let Some(id) = view.ids().first().copied() {
                        view.remove(id);
                    }
                }
                _ => log(&view, severity),
            }
            if (seed >> 16) % 3 == 0 {
                view.drain(&mut requests);
            }

            let shown = view.ids();
            assert!(shown.windows(2).all(|w| w[0] < w[1]));
            assert!(shown.len() <= 25);
            for entry in view.entries() {
                assert!(view.is_visible(entry.severity));
            }
        }
    }
}
