use std::io::BufRead;

use super::LineReader;
use crate::{error::Result, ConvertError, RefRecord};

/// Streaming reader of four-line FASTQ records.
///
/// Records are lent out one at a time and borrow the reader's buffers; the raw
/// line bytes are kept so that records can be written back out unchanged.
/// Blank lines are skipped, matching what validation accepts.
///
/// The reader does not re-validate the record grammar; inputs are expected to
/// have passed [`FastqValidator`](crate::FastqValidator) first.
pub struct FastqReader<R: BufRead> {
    /// Line source
    lines: LineReader<R>,

    /// Name of the stream used in error messages
    name: String,

    /// Buffer for the identifier line
    id: Vec<u8>,

    /// Buffer for the sequence line
    seq: Vec<u8>,

    /// Buffer for the separator line
    sep: Vec<u8>,

    /// Buffer for the quality line
    qual: Vec<u8>,

    /// Number of records processed
    n_processed: usize,
}
impl<R: BufRead> FastqReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_name(inner, "<stream>")
    }

    /// Create a reader whose errors refer to the stream as `name`
    pub fn with_name(inner: R, name: impl Into<String>) -> Self {
        Self {
            lines: LineReader::new(inner, true),
            name: name.into(),
            id: Vec::new(),
            seq: Vec::new(),
            sep: Vec::new(),
            qual: Vec::new(),
            n_processed: 0,
        }
    }

    /// Fill the record buffers, returning `false` at a clean end of stream
    fn fill(&mut self) -> Result<bool> {
        let buffers = [&mut self.id, &mut self.seq, &mut self.sep, &mut self.qual];
        for (idx, buffer) in buffers.into_iter().enumerate() {
            buffer.clear();
            match self.lines.next_line()? {
                Some(line) => buffer.extend_from_slice(line),
                None if idx == 0 => return Ok(false),
                None => {
                    return Err(ConvertError::TruncatedRecord {
                        path: self.name.clone(),
                        record: self.n_processed,
                    }
                    .into())
                }
            }
        }
        Ok(true)
    }

    pub fn next(&mut self) -> Option<Result<RefRecord<'_>>> {
        match self.fill() {
            Ok(true) => {}                 // continue with the next step
            Ok(false) => return None,      // end of file
            Err(e) => return Some(Err(e)), // unexpected error
        }

        // Increment the number of processed records
        self.n_processed += 1;

        Some(Ok(RefRecord::new(&self.id, &self.seq, &self.sep, &self.qual)))
    }

    pub fn n_processed(&self) -> usize {
        self.n_processed
    }
}
