use unicode_width::UnicodeWidthChar;

use msgscope_core::{MessageRecord, SeqId, Severity, ViewSink};

/// One rendered line of the message list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleRow {
    pub id: SeqId,
    pub severity: Severity,
    /// Local time, `HH:MM:SS.mmm`
    pub time: String,
    pub headline: String,
    /// Body lines not shown on the row
    pub extra_lines: usize,
}

impl ConsoleRow {
    fn from_record(record: &MessageRecord) -> Self {
        Self {
            id: record.id(),
            severity: record.severity(),
            time: record.timestamp().format("%H:%M:%S%.3f").to_string(),
            headline: record.headline().to_string(),
            extra_lines: record.extra_lines(),
        }
    }
}

/// The visual list: rows in the order the console placed them
#[derive(Debug, Default)]
pub struct RowSink {
    rows: Vec<ConsoleRow>,
}

impl RowSink {
    pub fn rows(&self) -> &[ConsoleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn position(&self, id: SeqId) -> Option<usize> {
        self.rows.binary_search_by_key(&id, |row| row.id).ok()
    }
}

impl ViewSink for RowSink {
    type Handle = SeqId;

    fn append(&mut self, record: &MessageRecord) -> SeqId {
        self.rows.push(ConsoleRow::from_record(record));
        record.id()
    }

    fn insert_before(&mut self, anchor: &SeqId, record: &MessageRecord) -> SeqId {
        let pos = self.position(*anchor).unwrap_or(self.rows.len());
        self.rows.insert(pos, ConsoleRow::from_record(record));
        record.id()
    }

    fn remove(&mut self, handle: SeqId) {
        if let Some(pos) = self.position(handle) {
            self.rows.remove(pos);
        }
    }
}

/// Cut `text` to at most `width` terminal columns, ending with `…` if cut
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            // Make room for the ellipsis
            while used + 1 > width {
                match out.pop() {
                    Some(last) => used -= last.width().unwrap_or(0),
                    None => return out,
                }
            }
            out.push('…');
            return out;
        }
        used += w;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use msgscope_core::Provenance;

    fn record(id: u64, body: &str) -> MessageRecord {
        MessageRecord::new(
            SeqId(id),
            Severity::Info,
            Local::now(),
            Provenance::default(),
            body.to_string(),
        )
    }

    #[test]
    fn test_rows_follow_sink_operations() {
        let mut sink = RowSink::default();
        let a = sink.append(&record(1, "one"));
        sink.append(&record(5, "five"));
        sink.insert_before(&SeqId(5), &record(3, "three\nmore"));
        sink.remove(a);

        let ids: Vec<u64> = sink.rows().iter().map(|row| row.id.0).collect();
        assert_eq!(ids, vec![3, 5]);
        assert_eq!(sink.rows()[0].headline, "three");
        assert_eq!(sink.rows()[0].extra_lines, 1);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 5), "hell…");
        // Wide characters take two columns
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
