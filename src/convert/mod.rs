//! Interleaving and deinterleaving of FASTQ mate pairs
//!
//! Both transforms stream records one at a time and copy their raw bytes.
//! Records are read through [`FastqReader`], which drops blank lines, so the
//! transforms work on the blank-line-free form of their input (the same form
//! [`normalize_file`](crate::normalize_file) produces). Over that form
//! `interleave(deinterleave(x)) == x` holds byte for byte, including a final
//! line without a terminator.
//!
//! Inputs are expected to have passed FASTQ validation already; the transforms
//! only guard against mismatched record counts and truncated records.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::{
    decompress::{create_output, ReadSource},
    error::Result,
    library::FileLayout,
    ConvertError, FastqReader, FastqWriter,
};

/// Files produced by a path level conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// The forward (or interleaved) output
    pub fwd: PathBuf,

    /// The reverse output, absent for interleaved output
    pub rev: Option<PathBuf>,

    /// Layout of the output files
    pub layout: FileLayout,

    /// Total number of records written
    pub records: usize,
}

/// Drain the remaining records of `reader`, returning its final record count
fn drain<R: BufRead>(reader: &mut FastqReader<R>) -> Result<usize> {
    while let Some(record) = reader.next() {
        record?;
    }
    Ok(reader.n_processed())
}

/// Split an interleaved stream into forward and reverse streams.
///
/// Record `2k` goes to `fwd` and record `2k + 1` to `rev`. Returns the number
/// of pairs written. A dangling final forward record is a
/// [`ConvertError::MismatchedPairCount`].
pub fn deinterleave<R: BufRead, F: Write, V: Write>(
    reader: &mut FastqReader<R>,
    fwd: &mut FastqWriter<F>,
    rev: &mut FastqWriter<V>,
) -> Result<usize> {
    while let Some(record) = reader.next() {
        let record = record?;
        if fwd.records_written() == rev.records_written() {
            fwd.write_record(&record)?;
        } else {
            rev.write_record(&record)?;
        }
    }
    fwd.flush()?;
    rev.flush()?;

    if fwd.records_written() != rev.records_written() {
        return Err(ConvertError::MismatchedPairCount {
            forward: fwd.records_written(),
            reverse: rev.records_written(),
        }
        .into());
    }
    Ok(fwd.records_written())
}

/// Merge forward and reverse streams into one interleaved stream.
///
/// Writes `fwd[k]` followed by `rev[k]` for every `k`. Returns the number of
/// pairs written. If either side runs out first, the other side is drained to
/// report both record counts in a [`ConvertError::MismatchedPairCount`].
pub fn interleave<F: BufRead, V: BufRead, W: Write>(
    fwd: &mut FastqReader<F>,
    rev: &mut FastqReader<V>,
    out: &mut FastqWriter<W>,
) -> Result<usize> {
    let mut pairs = 0;
    loop {
        let f = fwd.next().transpose()?;
        let r = rev.next().transpose()?;
        match (f, r) {
            (Some(f), Some(r)) => {
                out.write_record(&f)?;
                out.write_record(&r)?;
                pairs += 1;
            }
            (None, None) => break,
            (Some(_), None) => {
                return Err(ConvertError::MismatchedPairCount {
                    forward: drain(fwd)?,
                    reverse: rev.n_processed(),
                }
                .into());
            }
            (None, Some(_)) => {
                return Err(ConvertError::MismatchedPairCount {
                    forward: fwd.n_processed(),
                    reverse: drain(rev)?,
                }
                .into());
            }
        }
    }
    out.flush()?;
    Ok(pairs)
}

fn open_reader(path: &Path) -> Result<FastqReader<ReadSource>> {
    let source = ReadSource::open(path)?;
    Ok(FastqReader::with_name(source, path.display().to_string()))
}

/// Deinterleave the file at `input` into `fwd_out` and `rev_out`.
///
/// Compressed input is decoded on the fly; the outputs are always plain text.
pub fn deinterleave_file<P, Q, S>(input: P, fwd_out: Q, rev_out: S) -> Result<ConversionOutcome>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    S: AsRef<Path>,
{
    let mut reader = open_reader(input.as_ref())?;
    let mut fwd = FastqWriter::new(create_output(&fwd_out)?);
    let mut rev = FastqWriter::new(create_output(&rev_out)?);
    let pairs = deinterleave(&mut reader, &mut fwd, &mut rev)?;
    log::info!(
        "Deinterleaved {pairs} pairs from {}",
        input.as_ref().display()
    );
    Ok(ConversionOutcome {
        fwd: fwd_out.as_ref().to_path_buf(),
        rev: Some(rev_out.as_ref().to_path_buf()),
        layout: FileLayout::Paired,
        records: pairs * 2,
    })
}

/// Interleave the files at `fwd` and `rev` into `out`
pub fn interleave_files<P, Q, S>(fwd: P, rev: Q, out: S) -> Result<ConversionOutcome>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    S: AsRef<Path>,
{
    let mut fwd_reader = open_reader(fwd.as_ref())?;
    let mut rev_reader = open_reader(rev.as_ref())?;
    let mut writer = FastqWriter::new(create_output(&out)?);
    let pairs = interleave(&mut fwd_reader, &mut rev_reader, &mut writer)?;
    log::info!(
        "Interleaved {pairs} pairs from {} and {}",
        fwd.as_ref().display(),
        rev.as_ref().display()
    );
    Ok(ConversionOutcome {
        fwd: out.as_ref().to_path_buf(),
        rev: None,
        layout: FileLayout::Interleaved,
        records: pairs * 2,
    })
}

#[cfg(test)]
mod testing {
    use std::io::Cursor;

    use anyhow::Result;
    use rand::{rngs::SmallRng, Rng, SeedableRng};
    use tempfile::TempDir;

    use super::*;
    use crate::Error;

    const NUCLEOTIDES: &[u8] = b"ACGT";

    /// Generate `n_pairs` random mate pairs as (forward, reverse, interleaved) text
    fn generate_pairs(n_pairs: usize, seed: u64) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let (mut fwd, mut rev, mut inter) = (Vec::new(), Vec::new(), Vec::new());
        for idx in 0..n_pairs {
            for (mate, side) in [(1, &mut fwd), (2, &mut rev)] {
                let len = rng.random_range(20..150);
                let seq: Vec<u8> = (0..len)
                    .map(|_| NUCLEOTIDES[rng.random_range(0..4)])
                    .collect();
                let qual: Vec<u8> = (0..len).map(|_| rng.random_range(b'!'..=b'J')).collect();
                let mut record = format!("@read_{idx}/{mate}\n").into_bytes();
                record.extend_from_slice(&seq);
                record.extend_from_slice(b"\n+\n");
                record.extend_from_slice(&qual);
                record.push(b'\n');
                side.extend_from_slice(&record);
                inter.extend_from_slice(&record);
            }
        }
        (fwd, rev, inter)
    }

    fn run_deinterleave(data: &[u8]) -> crate::Result<(Vec<u8>, Vec<u8>)> {
        let mut reader = FastqReader::new(Cursor::new(data));
        let mut fwd = FastqWriter::new(Vec::new());
        let mut rev = FastqWriter::new(Vec::new());
        deinterleave(&mut reader, &mut fwd, &mut rev)?;
        Ok((fwd.into_inner(), rev.into_inner()))
    }

    fn run_interleave(fwd: &[u8], rev: &[u8]) -> crate::Result<Vec<u8>> {
        let mut fwd = FastqReader::new(Cursor::new(fwd));
        let mut rev = FastqReader::new(Cursor::new(rev));
        let mut out = FastqWriter::new(Vec::new());
        interleave(&mut fwd, &mut rev, &mut out)?;
        Ok(out.into_inner())
    }

    #[test]
    fn test_deinterleave_then_interleave() -> Result<()> {
        let (fwd, rev, inter) = generate_pairs(250, 42);
        let (split_fwd, split_rev) = run_deinterleave(&inter)?;
        assert_eq!(split_fwd, fwd);
        assert_eq!(split_rev, rev);
        assert_eq!(run_interleave(&split_fwd, &split_rev)?, inter);
        Ok(())
    }

    #[test]
    fn test_interleave_then_deinterleave() -> Result<()> {
        let (fwd, rev, inter) = generate_pairs(100, 7);
        let merged = run_interleave(&fwd, &rev)?;
        assert_eq!(merged, inter);
        assert_eq!(run_deinterleave(&merged)?, (fwd, rev));
        Ok(())
    }

    #[test]
    fn test_crlf_is_preserved() -> Result<()> {
        let inter = b"@a/1\r\nAC\r\n+\r\nII\r\n@a/2\r\nGT\r\n+\r\nJJ\r\n";
        let (fwd, rev) = run_deinterleave(inter)?;
        assert_eq!(fwd, b"@a/1\r\nAC\r\n+\r\nII\r\n");
        assert_eq!(run_interleave(&fwd, &rev)?, inter);
        Ok(())
    }

    #[test]
    fn test_round_trip_of_accepted_edge_inputs() -> Result<()> {
        use crate::{strip_blank_lines, FastqValidator};

        let inputs: [&[u8]; 4] = [
            b"@a/1\nAC\n+\nII\n@a/2\nGT\n+\nJJ",
            b"@a/1\nAC\n+\nII\n@a/2\nGT\n+\nJJ\n\n",
            b"\n@a/1\nAC\n\n+\nII\n@a/2\nGT\n+\nJJ\n\n\n",
            b"@a/1\r\nAC\r\n+\r\nII\r\n@a/2\r\nGT\r\n+\r\nJJ",
        ];
        for input in inputs {
            let verdict = FastqValidator::new(true).validate(Cursor::new(input))?;
            assert!(verdict.is_valid(), "{input:?}");

            let mut normalized = Vec::new();
            strip_blank_lines(Cursor::new(input), &mut normalized)?;

            let (fwd, rev) = run_deinterleave(input)?;
            assert_eq!(run_interleave(&fwd, &rev)?, normalized, "{input:?}");
        }

        // without blank lines the round trip reproduces the input itself
        let (fwd, rev) = run_deinterleave(inputs[0])?;
        assert_eq!(rev, b"@a/2\nGT\n+\nJJ");
        assert_eq!(run_interleave(&fwd, &rev)?, inputs[0]);
        Ok(())
    }

    #[test]
    fn test_interleave_count_mismatch() -> Result<()> {
        let (fwd, _, _) = generate_pairs(5, 1);
        let (_, rev, _) = generate_pairs(3, 1);
        let err = run_interleave(&fwd, &rev).unwrap_err();
        assert!(matches!(
            err,
            Error::ConvertError(ConvertError::MismatchedPairCount {
                forward: 5,
                reverse: 3
            })
        ));

        let err = run_interleave(&rev, &fwd).unwrap_err();
        assert!(matches!(
            err,
            Error::ConvertError(ConvertError::MismatchedPairCount {
                forward: 3,
                reverse: 5
            })
        ));
        Ok(())
    }

    #[test]
    fn test_deinterleave_odd_records() {
        let data = b"@a/1\nAC\n+\nII\n@a/2\nGT\n+\nII\n@b/1\nAC\n+\nII\n";
        let err = run_deinterleave(data).unwrap_err();
        assert!(matches!(
            err,
            Error::ConvertError(ConvertError::MismatchedPairCount {
                forward: 2,
                reverse: 1
            })
        ));
    }

    #[test]
    fn test_empty_streams() -> Result<()> {
        assert_eq!(run_deinterleave(b"")?, (Vec::new(), Vec::new()));
        assert!(run_interleave(b"", b"")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_file_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let (fwd, rev, inter) = generate_pairs(64, 3);
        let input = dir.path().join("reads.inter.fastq");
        std::fs::write(&input, &inter)?;

        let fwd_path = dir.path().join("reads.fwd.fastq");
        let rev_path = dir.path().join("reads.rev.fastq");
        let outcome = deinterleave_file(&input, &fwd_path, &rev_path)?;
        assert_eq!(outcome.layout, FileLayout::Paired);
        assert_eq!(outcome.records, 128);
        assert_eq!(outcome.rev.as_deref(), Some(rev_path.as_path()));
        assert_eq!(std::fs::read(&fwd_path)?, fwd);
        assert_eq!(std::fs::read(&rev_path)?, rev);

        let merged = dir.path().join("merged.fastq");
        let outcome = interleave_files(&fwd_path, &rev_path, &merged)?;
        assert_eq!(outcome.layout, FileLayout::Interleaved);
        assert!(outcome.rev.is_none());
        assert_eq!(std::fs::read(&merged)?, inter);
        Ok(())
    }

    #[test]
    fn test_compressed_input() -> Result<()> {
        let dir = TempDir::new()?;
        let (fwd, rev, inter) = generate_pairs(10, 11);
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::fast());
        encoder.write_all(&inter)?;
        let input = dir.path().join("reads.fq.bz2");
        std::fs::write(&input, encoder.finish()?)?;

        let fwd_path = dir.path().join("fwd.fq");
        let rev_path = dir.path().join("rev.fq");
        deinterleave_file(&input, &fwd_path, &rev_path)?;
        assert_eq!(std::fs::read(&fwd_path)?, fwd);
        assert_eq!(std::fs::read(&rev_path)?, rev);

        let plain = dir.path().join("plain.fq");
        assert_eq!(crate::normalize_file(&input, &plain)?, 0);
        assert_eq!(std::fs::read(&plain)?, inter);
        Ok(())
    }

    #[test]
    fn test_missing_input() -> Result<()> {
        let dir = TempDir::new()?;
        let err = interleave_files(
            dir.path().join("missing.fq"),
            dir.path().join("missing2.fq"),
            dir.path().join("out.fq"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileError(_)));
        Ok(())
    }
}
