//! Shared helpers for unit tests

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use msgscope_types::{MessageRecord, SeqId};

use crate::config::ConsoleConfig;
use crate::engine::{Console, ViewRequests};
use crate::transcript::{BLOCK_OPEN, BLOCK_OPEN_TAIL, SessionLog};
use crate::view::ViewSink;

/// In-memory transcript target that can be told to start failing
#[derive(Clone, Default)]
pub struct SharedBuf {
    bytes: Arc<Mutex<Vec<u8>>>,
    failing: Arc<AtomicBool>,
}

impl SharedBuf {
    pub fn text(&self) -> String {
        String::from_utf8(self.bytes.lock().clone()).unwrap()
    }

    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::other("disk full"));
        }
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Ids of the record blocks in a transcript, in file order
pub fn block_ids(text: &str) -> Vec<u64> {
    text.lines()
        .filter_map(|line| {
            let inner = line.strip_prefix(BLOCK_OPEN)?;
            let inner = inner.strip_suffix(BLOCK_OPEN_TAIL)?;
            inner.parse().ok()
        })
        .collect()
}

/// A console whose transcript goes to a `SharedBuf`
pub fn console_with_buf(config: ConsoleConfig) -> (Arc<Console>, ViewRequests, SharedBuf) {
    let buf = SharedBuf::default();
    let log = SessionLog::from_writer(buf.clone()).unwrap();
    let (console, requests) = Console::with_log(config, log);
    (console, requests, buf)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkOp {
    Append(SeqId),
    InsertBefore { anchor: SeqId, id: SeqId },
    Remove(SeqId),
}

/// View sink that records every operation, using record ids as handles
#[derive(Default)]
pub struct RecordingSink {
    pub ops: Vec<SinkOp>,
}

impl ViewSink for RecordingSink {
    type Handle = SeqId;

    fn append(&mut self, record: &MessageRecord) -> SeqId {
        self.ops.push(SinkOp::Append(record.id()));
        record.id()
    }

    fn insert_before(&mut self, anchor: &SeqId, record: &MessageRecord) -> SeqId {
        self.ops.push(SinkOp::InsertBefore {
            anchor: *anchor,
            id: record.id(),
        });
        record.id()
    }

    fn remove(&mut self, handle: SeqId) {
        self.ops.push(SinkOp::Remove(handle));
    }
}
