use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::{
    decompress::{create_output, ReadSource},
    error::Result,
    record::is_blank,
};

/// A line source over a buffered stream.
///
/// Lines are handed out raw, including their terminator. When blank line
/// skipping is enabled, empty and whitespace-only lines are dropped on the fly;
/// the underlying stream is never modified.
#[derive(Debug)]
pub struct LineReader<R: BufRead> {
    /// Inner reader
    inner: R,

    /// Buffer for the current line
    buffer: Vec<u8>,

    /// Drop blank lines instead of returning them
    skip_blank: bool,

    /// Physical (1-based) line number of the last line read
    line_number: usize,

    /// Number of blank lines dropped so far
    n_blank: u64,
}
impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R, skip_blank: bool) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            skip_blank,
            line_number: 0,
            n_blank: 0,
        }
    }

    /// Returns the next line, or `None` at the end of the stream
    pub fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        Ok(self.next_numbered()?.map(|(_, line)| line))
    }

    /// Returns the next line together with its physical (1-based) line number
    pub fn next_numbered(&mut self) -> io::Result<Option<(usize, &[u8])>> {
        loop {
            self.buffer.clear();
            if self.inner.read_until(b'\n', &mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if self.skip_blank && is_blank(&self.buffer) {
                self.n_blank += 1;
                continue;
            }
            return Ok(Some((self.line_number, &self.buffer)));
        }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn n_blank(&self) -> u64 {
        self.n_blank
    }
}

/// Copy `reader` to `writer`, dropping blank lines.
///
/// Returns the number of lines dropped.
pub fn strip_blank_lines<R: BufRead, W: Write>(reader: R, writer: &mut W) -> io::Result<u64> {
    let mut lines = LineReader::new(reader, true);
    while let Some(line) = lines.next_line()? {
        writer.write_all(line)?;
    }
    writer.flush()?;
    Ok(lines.n_blank())
}

/// Write a blank-line-free, decompressed copy of `src` to `dst`.
///
/// This is the explicit form of the normalization the validators apply on the
/// fly; `src` is left untouched.
pub fn normalize_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<u64> {
    let mut source = ReadSource::open(src)?;
    let mut output = create_output(dst)?;
    let n_blank = strip_blank_lines(&mut source, &mut output)?;
    if n_blank > 0 {
        log::debug!(
            "Dropped {n_blank} blank lines from {}",
            source.path().display()
        );
    }
    Ok(n_blank)
}
