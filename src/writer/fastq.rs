use std::io::{self, Write};

use crate::RefRecord;

/// Writes FASTQ records verbatim.
///
/// The raw line bytes of each record are written unchanged. A line without a
/// terminator (the last line of a file lacking a trailing newline) stays
/// unterminated unless another line follows it, in which case a `\n` is
/// written first so records never run together.
pub struct FastqWriter<W: Write> {
    /// Inner writer
    inner: W,

    /// Number of records written
    records_written: usize,

    /// The last line written had no terminator
    pending_newline: bool,
}
impl<W: Write> FastqWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            records_written: 0,
            pending_newline: false,
        }
    }

    /// Write a single record
    pub fn write_record(&mut self, record: &RefRecord) -> io::Result<()> {
        for line in record.lines() {
            if self.pending_newline {
                self.inner.write_all(b"\n")?;
            }
            self.inner.write_all(line)?;
            self.pending_newline = !line.ends_with(b"\n");
        }
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
