use std::io::{self, BufRead};

use super::{Verdict, Violation};
use crate::{reader::LineReader, record::pair_key, record::trim_newline};

/// Position of a line within a four-line FASTQ record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Header,
    Sequence,
    Separator,
    Quality,
}
impl State {
    fn next(self) -> Self {
        match self {
            Self::Header => Self::Sequence,
            Self::Sequence => Self::Separator,
            Self::Separator => Self::Quality,
            Self::Quality => Self::Header,
        }
    }
}

/// Streaming FASTQ grammar checker.
///
/// Each record must be a header line starting with `@`, a non-blank sequence
/// line, a separator line starting with `+`, and a quality line as long as the
/// sequence. The first violation ends the scan.
///
/// Mate pairing is checked on records `2k` and `2k+1`:
/// * declared interleaved: both records must share the same [`pair_key`];
/// * declared single-direction: they must *not*, otherwise the file is really
///   interleaved.
#[derive(Debug, Clone, Copy)]
pub struct FastqValidator {
    /// The file is declared to hold alternating forward/reverse mates
    interleaved: bool,

    /// Drop blank lines before applying the grammar
    strip_blank_lines: bool,
}
impl Default for FastqValidator {
    fn default() -> Self {
        Self::new(false)
    }
}
impl FastqValidator {
    pub fn new(interleaved: bool) -> Self {
        Self {
            interleaved,
            strip_blank_lines: true,
        }
    }

    /// Set whether blank lines are dropped before validation (default: `true`)
    #[must_use]
    pub fn strip_blank_lines(mut self, strip: bool) -> Self {
        self.strip_blank_lines = strip;
        self
    }

    /// Validate a full stream.
    ///
    /// Only I/O failures are errors; grammar violations are reported in the
    /// returned [`Verdict`].
    pub fn validate<R: BufRead>(&self, reader: R) -> io::Result<Verdict> {
        let mut lines = LineReader::new(reader, self.strip_blank_lines);
        let mut state = State::Header;
        let mut n_records = 0;
        let mut seq_len = 0;
        let mut prev_key: Vec<u8> = Vec::new();

        while let Some((line_number, raw)) = lines.next_numbered()? {
            let line = trim_newline(raw);

            match state {
                State::Header => {
                    if !line.starts_with(b"@") {
                        return Ok(Verdict::Invalid(Violation::MissingHeader { line: line_number }));
                    }
                    if let Some(violation) = self.check_pairing(n_records, line, &mut prev_key) {
                        return Ok(Verdict::Invalid(violation));
                    }
                }
                State::Sequence => {
                    if line.iter().all(u8::is_ascii_whitespace) {
                        return Ok(Verdict::Invalid(Violation::EmptySequence { line: line_number }));
                    }
                    seq_len = line.len();
                }
                State::Separator => {
                    if !line.starts_with(b"+") {
                        let violation = Violation::MissingSeparator { line: line_number };
                        return Ok(Verdict::Invalid(violation));
                    }
                }
                State::Quality => {
                    if line.len() != seq_len {
                        return Ok(Verdict::Invalid(Violation::QualityLength {
                            line: line_number,
                            expected: seq_len,
                            found: line.len(),
                        }));
                    }
                    n_records += 1;
                }
            }
            state = state.next();
        }

        Ok(match state {
            State::Header if n_records == 0 => Verdict::Invalid(Violation::EmptyFile),
            State::Header if self.interleaved && n_records % 2 == 1 => {
                Verdict::Invalid(Violation::DanglingMate {
                    record: n_records - 1,
                })
            }
            State::Header => Verdict::Valid { records: n_records },
            _ => Verdict::Invalid(Violation::IncompleteRecord {
                line: lines.line_number(),
            }),
        })
    }

    /// Check the header of record `index` against the header of its would-be mate
    fn check_pairing(
        &self,
        index: usize,
        header: &[u8],
        prev_key: &mut Vec<u8>,
    ) -> Option<Violation> {
        let key = pair_key(header);
        if index % 2 == 0 {
            prev_key.clear();
            prev_key.extend_from_slice(key);
            return None;
        }
        let same = key == prev_key.as_slice();
        match (self.interleaved, same) {
            (true, false) => Some(Violation::UnpairedMates { record: index }),
            (false, true) => Some(Violation::UnexpectedMates { record: index }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod testing {
    use std::io::Cursor;

    use anyhow::Result;

    use super::*;

    fn check(data: &str, interleaved: bool) -> Result<Verdict> {
        Ok(FastqValidator::new(interleaved).validate(Cursor::new(data))?)
    }

    const INTERLEAVED: &str = "\
@frag1/1\nACGTAC\n+\nIIIIII\n\
@frag1/2\nGTACGT\n+\nHHHHHH\n\
@frag2/1\nTTTT\n+frag2/1\nBBBB\n\
@frag2/2\nAAAA\n+\nBBBB\n";

    #[test]
    fn test_single_record() -> Result<()> {
        assert_eq!(check("@r1\nACGT\n+\nIIII\n", false)?, Verdict::Valid { records: 1 });
        Ok(())
    }

    #[test]
    fn test_short_quality() -> Result<()> {
        let verdict = check("@r1\nACGT\n+\nIII\n", false)?;
        assert_eq!(
            verdict,
            Verdict::Invalid(Violation::QualityLength {
                line: 4,
                expected: 4,
                found: 3
            })
        );
        Ok(())
    }

    #[test]
    fn test_empty_file() -> Result<()> {
        assert_eq!(check("", false)?, Verdict::Invalid(Violation::EmptyFile));
        assert_eq!(check("\n\n", false)?, Verdict::Invalid(Violation::EmptyFile));
        Ok(())
    }

    #[test]
    fn test_line_count_not_multiple_of_four() -> Result<()> {
        for data in ["@r1\n", "@r1\nACGT\n", "@r1\nACGT\n+\n", "@r1\nA\n+\nI\n@r2\n"] {
            let verdict = check(data, false)?;
            assert!(
                matches!(verdict, Verdict::Invalid(Violation::IncompleteRecord { .. })),
                "{data:?} -> {verdict:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn test_structural_violations() -> Result<()> {
        assert_eq!(
            check(">r1\nACGT\n+\nIIII\n", false)?,
            Verdict::Invalid(Violation::MissingHeader { line: 1 })
        );
        assert!(!check("@r1\n  \n+\nIIII\n", false)?.is_valid());
        assert_eq!(
            check("@r1\nACGT\n-\nIIII\n", false)?,
            Verdict::Invalid(Violation::MissingSeparator { line: 3 })
        );
        Ok(())
    }

    #[test]
    fn test_blank_lines_are_dropped() -> Result<()> {
        let data = "@r1\nACGT\n\n+\nIIII\n\n\n@r2\nGG\n+\nII\n\n";
        assert_eq!(check(data, false)?, Verdict::Valid { records: 2 });

        let strict = FastqValidator::new(false)
            .strip_blank_lines(false)
            .validate(Cursor::new(data))?;
        assert!(!strict.is_valid());
        Ok(())
    }

    #[test]
    fn test_interleaved_declared() -> Result<()> {
        assert_eq!(check(INTERLEAVED, true)?, Verdict::Valid { records: 4 });
        Ok(())
    }

    #[test]
    fn test_interleaved_declared_single() -> Result<()> {
        assert_eq!(
            check(INTERLEAVED, false)?,
            Verdict::Invalid(Violation::UnexpectedMates { record: 1 })
        );

        let data = "@read/1\nACGT\n+\nIIII\n@read/2\nACGT\n+\nIIII\n";
        assert!(!check(data, false)?.is_valid());
        Ok(())
    }

    #[test]
    fn test_mismatched_mates() -> Result<()> {
        let data = "@a/1\nAC\n+\nII\n@b/2\nAC\n+\nII\n";
        assert_eq!(
            check(data, true)?,
            Verdict::Invalid(Violation::UnpairedMates { record: 1 })
        );
        Ok(())
    }

    #[test]
    fn test_dangling_mate() -> Result<()> {
        let data = "@a/1\nAC\n+\nII\n@a/2\nGT\n+\nII\n@b/1\nAC\n+\nII\n";
        assert_eq!(
            check(data, true)?,
            Verdict::Invalid(Violation::DanglingMate { record: 2 })
        );
        assert_eq!(check(data, false)?, Verdict::Invalid(Violation::UnexpectedMates { record: 1 }));
        Ok(())
    }

    #[test]
    fn test_interleaved_missing_line() -> Result<()> {
        // the second record lost its separator, shifting every following line
        let data = "@a/1\nAC\n+\nII\n@a/2\nAC\nII\n@b/1\nAC\n+\nII\n@b/2\nAC\n+\nII\n";
        assert!(!check(data, true)?.is_valid());
        Ok(())
    }

    #[test]
    fn test_single_direction_distinct_ids() -> Result<()> {
        let data = "@r1\nAC\n+\nII\n@r2\nAC\n+\nII\n@r3\nAC\n+\nII\n";
        assert_eq!(check(data, false)?, Verdict::Valid { records: 3 });
        Ok(())
    }

    #[test]
    fn test_casava_pairs() -> Result<()> {
        let data = "\
@M1:1:FC:1:1:1:1 1:N:0:ACGT\nAC\n+\nII\n\
@M1:1:FC:1:1:1:1 2:N:0:ACGT\nGT\n+\nII\n";
        assert!(check(data, true)?.is_valid());
        assert!(!check(data, false)?.is_valid());
        Ok(())
    }
}
