use std::sync::Arc;

use chrono::Local;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::info;

use msgscope_types::{MessageRecord, Provenance, SeqId, Severity, Visibility};

use crate::arena::RecordArena;
use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use crate::store::LaneTable;
use crate::transcript::SessionLog;

/// Called once, outside the ingestion lock, after a fatal record is written
pub type FatalHook = Arc<dyn Fn(&MessageRecord) + Send + Sync>;

fn abort_on_fatal(_: &MessageRecord) {
    std::process::abort()
}

/// Work handed from producers to the context that owns the view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewRequest {
    /// A new record of a visible severity should be displayed
    Materialize(SeqId),
}

/// Receiving end of the producer-to-view queue, in dispatch order
pub struct ViewRequests {
    rx: mpsc::UnboundedReceiver<ViewRequest>,
}

impl ViewRequests {
    /// Receive the next request
    pub async fn recv(&mut self) -> Option<ViewRequest> {
        self.rx.recv().await
    }

    /// Take a pending request without waiting
    pub fn try_recv(&mut self) -> Option<ViewRequest> {
        self.rx.try_recv().ok()
    }
}

/// Counters describing the session so far
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsoleStats {
    /// Records dispatched, fatal included
    pub dispatched: u64,
    /// Retained count per lane (debug, info, warning, critical)
    pub retained: [usize; 4],
    /// Evicted count per lane
    pub evicted: [u64; 4],
    /// Failed transcript writes
    pub transcript_faults: u64,
    /// Records alive in the arena
    pub live_records: usize,
    /// A fatal record ended the session
    pub halted: bool,
}

impl ConsoleStats {
    pub fn retained_for(&self, severity: Severity) -> usize {
        severity.lane().map_or(0, |i| self.retained[i])
    }

    pub fn evicted_for(&self, severity: Severity) -> u64 {
        severity.lane().map_or(0, |i| self.evicted[i])
    }

    pub fn total_retained(&self) -> usize {
        self.retained.iter().sum()
    }
}

/// Everything guarded by the ingestion lock
struct Session {
    next_id: u64,
    arena: RecordArena,
    lanes: LaneTable,
    log: SessionLog,
    dispatched: u64,
    transcript_faults: u64,
    halted: bool,
}

impl Session {
    fn accepts(&self) -> bool {
        !self.halted && !self.log.is_closed()
    }

    /// Store a non-fatal record and queue it for display if its lane is shown
    fn retain(&mut self, record: MessageRecord, requests: &mpsc::UnboundedSender<ViewRequest>) {
        let id = record.id();
        let Some(lane) = self.lanes.get_mut(record.severity()) else {
            return;
        };

        let evicted = lane.store.push(id);
        if evicted.is_some() {
            lane.evicted += 1;
        }
        let visible = lane.visible;

        self.arena.insert(record, visible);
        if let Some(old) = evicted {
            self.arena.release_retention(old);
        }

        // No view is listening; nothing will ever display it
        if visible && requests.send(ViewRequest::Materialize(id)).is_err() {
            self.arena.release_display(id);
        }
    }
}

/// The message console: ingestion entry point and owner of the retained history.
///
/// `record` may be called from any thread. Id allocation, the transcript
/// write and store mutation happen under one lock, so ids, the transcript
/// and the view request queue all share the same order.
pub struct Console {
    session: Mutex<Session>,
    requests: mpsc::UnboundedSender<ViewRequest>,
    on_fatal: RwLock<FatalHook>,
    config: ConsoleConfig,
}

impl Console {
    /// Start a session, truncating the configured log file
    pub fn new(config: ConsoleConfig) -> Result<(Arc<Self>, ViewRequests), ConsoleError> {
        let config = config.sanitized();
        let log = SessionLog::create(&config.log_file)?;
        let path = config.log_file.clone();
        let console = Self::assemble(config, log);
        info!(log_file = %path.display(), "console session started");
        Ok(console)
    }

    /// Start a session writing its transcript to `log`
    pub fn with_log(config: ConsoleConfig, log: SessionLog) -> (Arc<Self>, ViewRequests) {
        Self::assemble(config.sanitized(), log)
    }

    /// A console with default settings, for callers that were never given one.
    /// Falls back to discarding the transcript if the default log cannot be created.
    pub(crate) fn fallback() -> Arc<Self> {
        let config = ConsoleConfig::default();
        let log = SessionLog::create(&config.log_file).unwrap_or_else(|_| SessionLog::discard());
        // Dropping the receiver: nothing is ever displayed
        let (console, _requests) = Self::assemble(config, log);
        console
    }

    fn assemble(config: ConsoleConfig, log: SessionLog) -> (Arc<Self>, ViewRequests) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session {
            next_id: 0,
            arena: RecordArena::default(),
            lanes: LaneTable::new(&config),
            log,
            dispatched: 0,
            transcript_faults: 0,
            halted: false,
        };
        let console = Self {
            session: Mutex::new(session),
            requests: tx,
            on_fatal: RwLock::new(Arc::new(abort_on_fatal) as FatalHook),
            config,
        };
        (Arc::new(console), ViewRequests { rx })
    }

    /// Replace what happens after a fatal record is written
    pub fn set_fatal_hook<F>(&self, hook: F)
    where
        F: Fn(&MessageRecord) + Send + Sync + 'static,
    {
        let hook: FatalHook = Arc::new(hook);
        *self.on_fatal.write() = hook;
    }

    /// Ingest one message. Never fails; a Fatal message ends the session and
    /// runs the fatal hook (by default the process aborts).
    pub fn record(&self, severity: Severity, provenance: Provenance, body: impl Into<String>) {
        let body = body.into();

        let fatal = {
            let mut session = self.session.lock();
            if !session.accepts() {
                return;
            }

            let id = SeqId(session.next_id);
            session.next_id += 1;
            session.dispatched += 1;

            let record = MessageRecord::new(id, severity, Local::now(), provenance, body);
            if session.log.append(&record).is_err() {
                session.transcript_faults += 1;
            }

            if severity == Severity::Fatal {
                session.halted = true;
                if session.log.close().is_err() {
                    session.transcript_faults += 1;
                }
                Some(record)
            } else {
                session.retain(record, &self.requests);
                None
            }
        };

        if let Some(record) = fatal {
            let hook = self.on_fatal.read().clone();
            hook(&record);
        }
    }

    /// Write the `\END` marker. Later records are ignored.
    pub fn close(&self) {
        let mut session = self.session.lock();
        if session.log.close().is_err() {
            session.transcript_faults += 1;
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Copy of a live record
    pub fn record_snapshot(&self, id: SeqId) -> Option<MessageRecord> {
        self.session.lock().arena.get(id).cloned()
    }

    /// Retained ids of one severity, oldest first
    pub fn retained_ids(&self, severity: Severity) -> Vec<SeqId> {
        let session = self.session.lock();
        session
            .lanes
            .get(severity)
            .map(|lane| lane.store.iter().collect())
            .unwrap_or_default()
    }

    pub fn is_visible(&self, severity: Severity) -> bool {
        self.session.lock().lanes.is_visible(severity)
    }

    pub fn visibility(&self) -> Visibility {
        self.session.lock().lanes.visibility()
    }

    pub fn is_halted(&self) -> bool {
        self.session.lock().halted
    }

    pub fn stats(&self) -> ConsoleStats {
        let session = self.session.lock();
        let mut stats = ConsoleStats {
            dispatched: session.dispatched,
            transcript_faults: session.transcript_faults,
            live_records: session.arena.len(),
            halted: session.halted,
            ..Default::default()
        };
        for (i, severity) in Severity::RETAINED.iter().enumerate() {
            if let Some(lane) = session.lanes.get(*severity) {
                stats.retained[i] = lane.store.len();
                stats.evicted[i] = lane.evicted;
            }
        }
        stats
    }

    // ------------------------------------------------------------------
    // View side. Only the context that owns the view calls these.
    // ------------------------------------------------------------------

    /// Show a lane. Returns its retained records oldest first, at most `room`
    /// of them, each marked displayed; `None` if the lane was already shown.
    pub(crate) fn show(&self, severity: Severity, room: usize) -> Option<Vec<MessageRecord>> {
        let mut session = self.session.lock();
        let session = &mut *session;
        let lane = session.lanes.get_mut(severity)?;
        if lane.visible {
            return None;
        }
        lane.visible = true;

        let mut records = Vec::new();
        for id in lane.store.iter().take(room) {
            if !session.arena.pin_display(id) {
                debug_assert!(false, "retained id {id} missing from arena");
                continue;
            }
            if let Some(record) = session.arena.get(id) {
                records.push(record.clone());
            }
        }
        Some(records)
    }

    /// Hide a lane. Returns false if it was already hidden.
    pub(crate) fn hide(&self, severity: Severity) -> bool {
        let mut session = self.session.lock();
        match session.lanes.get_mut(severity) {
            Some(lane) if lane.visible => {
                lane.visible = false;
                true
            }
            _ => false,
        }
    }

    /// Resolve a materialize request. `None` if the record is gone or its
    /// lane was hidden since the request was queued.
    pub(crate) fn materialize(&self, id: SeqId) -> Option<MessageRecord> {
        let mut session = self.session.lock();
        let visible = session
            .arena
            .get(id)
            .is_some_and(|record| session.lanes.is_visible(record.severity()));

        if visible {
            session.arena.get(id).cloned()
        } else {
            session.arena.release_display(id);
            None
        }
    }

    /// The view dropped these entries
    pub(crate) fn release_view(&self, ids: &[SeqId]) {
        if ids.is_empty() {
            return;
        }
        let mut session = self.session.lock();
        for id in ids {
            session.arena.release_display(*id);
        }
    }

    /// Permanently drop one record from its store. Returns false if it was
    /// already evicted or removed.
    pub(crate) fn discard(&self, id: SeqId) -> bool {
        let mut session = self.session.lock();
        let session = &mut *session;
        let Some(record) = session.arena.discard(id) else {
            return false;
        };
        match session.lanes.get_mut(record.severity()) {
            Some(lane) => lane.store.remove(id),
            None => false,
        }
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        // Best effort end marker
        let _ = self.session.get_mut().log.close();
    }
}
