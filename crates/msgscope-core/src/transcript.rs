use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

use msgscope_types::{MessageRecord, iso_millis};

use crate::error::ConsoleError;

/// Append-only transcript of every message in the session.
///
/// The file is truncated when the session starts, opened with a `\BEGIN`
/// marker and closed with `\END`. Each record is written as one block and
/// flushed immediately.
pub struct SessionLog {
    out: Box<dyn Write + Send>,
    closed: bool,
}

impl SessionLog {
    /// Create (or truncate) the session log file
    pub fn create(path: &Path) -> Result<Self, ConsoleError> {
        let file = File::create(path).map_err(|source| ConsoleError::OpenLog {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_writer(file)
    }

    /// Start a session on an arbitrary writer
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Result<Self, ConsoleError> {
        let mut log = Self {
            out: Box::new(writer),
            closed: false,
        };
        log.write_marker("BEGIN").map_err(ConsoleError::LogHeader)?;
        Ok(log)
    }

    /// A session log that discards everything
    pub fn discard() -> Self {
        Self {
            out: Box::new(io::sink()),
            closed: false,
        }
    }

    /// Append one record block
    pub fn append(&mut self, record: &MessageRecord) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.out.write_all(render_block(record).as_bytes())?;
        self.out.flush()
    }

    /// Write the `\END` marker. Later appends are ignored.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.write_marker("END")
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn write_marker(&mut self, marker: &str) -> io::Result<()> {
        writeln!(self.out, "\\{} {}", marker, iso_millis(&Local::now()))?;
        self.out.flush()
    }
}

/// Opening delimiter: 16 `<` before the id, 15 after
pub(crate) const BLOCK_OPEN: &str = "<<<<<<<<<<<<<<<<";
pub(crate) const BLOCK_OPEN_TAIL: &str = "<<<<<<<<<<<<<<<";
/// Closing delimiter, 15 `>` on each side of the id
const BLOCK_CLOSE: &str = ">>>>>>>>>>>>>>>";

/// Render the transcript block for one record
pub fn render_block(record: &MessageRecord) -> String {
    let id = record.id();
    let mut block = String::new();

    // Writing into a String cannot fail
    let _ = write!(
        block,
        "{BLOCK_OPEN}{id}{BLOCK_OPEN_TAIL}\n\
         \\origin:\n{file} {line}\n\n\
         \\function_call:\n{function}\n\n\
         \\category:\n{category}\n\n\
         \\time_date:\n{time}\n\n\
         \\{severity}\\id{id}:\n{body}\n\
         {BLOCK_CLOSE}{id}{BLOCK_CLOSE}\n",
        file = record.source_file(),
        line = record.source_line(),
        function = record.function_name(),
        category = record.category(),
        time = record.iso_time(),
        severity = record.severity().as_str(),
        body = record.body(),
    );

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use msgscope_types::{Provenance, SeqId, Severity};
    use crate::testing::SharedBuf;

    fn sample() -> MessageRecord {
        let ts = Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        MessageRecord::new(
            SeqId(42),
            Severity::Warning,
            ts,
            Provenance::new("src/net.rs", 17)
                .with_function("net::connect")
                .with_category("net"),
            "retrying\nattempt 2".to_string(),
        )
    }

    #[test]
    fn test_block_format() {
        let block = render_block(&sample());
        let expected = "<<<<<<<<<<<<<<<<42<<<<<<<<<<<<<<<\n\
                        \\origin:\nsrc/net.rs 17\n\n\
                        \\function_call:\nnet::connect\n\n\
                        \\category:\nnet\n\n\
                        \\time_date:\n2024-01-15T10:30:00.000\n\n\
                        \\warning\\id42:\nretrying\nattempt 2\n\
                        >>>>>>>>>>>>>>>42>>>>>>>>>>>>>>>\n";
        assert_eq!(block, expected);
    }

    #[test]
    fn test_opening_line_widths() {
        let block = render_block(&sample());
        let opening = block.lines().next().unwrap();
        let leading = opening.chars().take_while(|c| *c == '<').count();
        let trailing = opening.chars().rev().take_while(|c| *c == '<').count();
        assert_eq!((leading, trailing), (16, 15));
        assert_eq!(&opening[leading..opening.len() - trailing], "42");
    }

    #[test]
    fn test_begin_and_end_markers() {
        let buf = SharedBuf::default();
        let mut log = SessionLog::from_writer(buf.clone()).unwrap();
        log.append(&sample()).unwrap();
        log.close().unwrap();
        log.append(&sample()).unwrap();
        log.close().unwrap();

        let text = buf.text();
        assert!(text.starts_with("\\BEGIN "));
        assert!(text.trim_end().lines().last().unwrap().starts_with("\\END "));
        assert_eq!(text.matches("<<<<<<<<<<<<<<<<42<").count(), 1);
        assert_eq!(text.matches("\\END ").count(), 1);
    }
}
