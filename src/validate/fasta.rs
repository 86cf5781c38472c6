use std::io::{self, BufRead};

use super::{Verdict, Violation};
use crate::{reader::LineReader, record::trim_newline};

/// Streaming FASTA grammar checker.
///
/// A valid file is one or more records, each a `>` header followed by one or
/// more non-empty sequence lines. Empty lines are not tolerated anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastaValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Start of file: only a header may follow
    Header,
    /// After a header: at least one sequence line is required
    FirstSequence,
    /// Inside a record: another sequence line or the next header
    SequenceOrHeader,
}

impl FastaValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate<R: BufRead>(&self, reader: R) -> io::Result<Verdict> {
        let mut lines = LineReader::new(reader, false);
        let mut expect = Expect::Header;
        let mut n_records = 0;

        while let Some((line_number, raw)) = lines.next_numbered()? {
            let line = trim_newline(raw);
            let is_header = line.starts_with(b">");

            if line.is_empty() {
                return Ok(Verdict::Invalid(Violation::EmptySequence { line: line_number }));
            }

            expect = match (expect, is_header) {
                (Expect::Header, false) => {
                    return Ok(Verdict::Invalid(Violation::MissingHeader { line: line_number }))
                }
                (Expect::FirstSequence, true) => {
                    return Ok(Verdict::Invalid(Violation::EmptyRecord { line: line_number }))
                }
                (Expect::Header | Expect::SequenceOrHeader, true) => {
                    n_records += 1;
                    Expect::FirstSequence
                }
                (Expect::FirstSequence | Expect::SequenceOrHeader, false) => {
                    Expect::SequenceOrHeader
                }
            };
        }

        Ok(match expect {
            Expect::Header => Verdict::Invalid(Violation::EmptyFile),
            Expect::FirstSequence => Verdict::Invalid(Violation::EmptyRecord {
                line: lines.line_number() + 1,
            }),
            Expect::SequenceOrHeader => Verdict::Valid { records: n_records },
        })
    }
}
