//! Structural validation of FASTA and FASTQ files
//!
//! Validation is a single streaming pass per file. A file that breaks the
//! grammar is not an error: it yields `valid == false`. Errors are reserved for
//! problems with the call itself (missing files, unsupported formats) and for
//! I/O failures such as corrupt archives.

mod fasta;
mod fastq;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    decompress::{resolve_path, ReadSource},
    error::Result,
    format,
};
use crate::format::ReadFormat;

pub use fasta::FastaValidator;
pub use fastq::{FastqValidator, State};

/// The first grammar violation found in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The file holds no records
    EmptyFile,
    /// A header line was expected but the line does not start with `@` (FASTQ) or `>` (FASTA)
    MissingHeader { line: usize },
    /// A sequence line is empty or blank
    EmptySequence { line: usize },
    /// A FASTA header is not followed by any sequence line
    EmptyRecord { line: usize },
    /// A FASTQ separator line does not start with `+`
    MissingSeparator { line: usize },
    /// A FASTQ quality line differs in length from its sequence line
    QualityLength {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// The file ends part-way through a FASTQ record
    IncompleteRecord { line: usize },
    /// Mates were found in a file declared as single-direction reads
    UnexpectedMates { record: usize },
    /// Records `2k` and `2k+1` of an interleaved file do not share a read identifier
    UnpairedMates { record: usize },
    /// An interleaved file ends with a forward read that has no mate
    DanglingMate { record: usize },
}
impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFile => write!(f, "no records found"),
            Self::MissingHeader { line } => write!(f, "line {line}: expected a header line"),
            Self::EmptySequence { line } => write!(f, "line {line}: empty sequence line"),
            Self::EmptyRecord { line } => write!(f, "line {line}: header has no sequence"),
            Self::MissingSeparator { line } => write!(f, "line {line}: expected a '+' separator"),
            Self::QualityLength {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {line}: quality length {found} does not match sequence length {expected}"
            ),
            Self::IncompleteRecord { line } => write!(f, "line {line}: incomplete final record"),
            Self::UnexpectedMates { record } => write!(
                f,
                "record {record}: mate pair found in a file declared as not interleaved"
            ),
            Self::UnpairedMates { record } => {
                write!(f, "record {record}: read identifier does not match its mate")
            }
            Self::DanglingMate { record } => write!(f, "record {record}: missing reverse mate"),
        }
    }
}

/// Outcome of validating a single stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid { records: usize },
    Invalid(Violation),
}
impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    fn log(&self, path: &Path) {
        match self {
            Self::Valid { records } => log::debug!("{}: {records} valid records", path.display()),
            Self::Invalid(violation) => {
                log::warn!("{} failed validation: {violation}", path.display());
            }
        }
    }
}

/// Input to [`validate_fastq`] for a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateFastqParams {
    /// The file to validate
    pub path: PathBuf,

    /// Whether the file holds interleaved mate pairs (default: `false`)
    pub interleaved: bool,
}
impl ValidateFastqParams {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            interleaved: false,
        }
    }

    #[must_use]
    pub fn interleaved(mut self, interleaved: bool) -> Self {
        self.interleaved = interleaved;
        self
    }
}

/// Input to [`validate_fasta`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateFastaParams {
    pub path: PathBuf,
}
impl ValidateFastaParams {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

/// Output of [`validate_fastq`] for a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FastqValidation {
    pub validated: bool,
}

/// Output of [`validate_fasta`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
}

/// Options shared by all validation calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Drop blank lines before applying the FASTQ grammar
    pub strip_blank_lines: bool,

    /// Worker threads for batch validation; `0` uses every available CPU
    pub num_threads: usize,
}
impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strip_blank_lines: true,
            num_threads: 0,
        }
    }
}
impl ValidationConfig {
    /// Number of threads to use for a batch of `n_files`
    pub fn threads_for(&self, n_files: usize) -> usize {
        let available = if self.num_threads == 0 {
            num_cpus::get()
        } else {
            self.num_threads.min(num_cpus::get())
        };
        available.clamp(1, n_files.max(1))
    }
}

/// Validate a single FASTQ file.
///
/// The path must name a regular file with a FASTQ suffix. Compressed files are
/// decoded on the fly; the file itself is never modified.
pub fn validate_fastq_file<P: AsRef<Path>>(
    path: P,
    interleaved: bool,
    config: &ValidationConfig,
) -> Result<Verdict> {
    let path = path.as_ref();
    resolve_path(path)?;
    format::require(path, None, None, ReadFormat::Fastq)?;
    validate_fastq_path(path, interleaved, config)
}

/// Validate the FASTQ file at `path` without looking at its name.
///
/// Callers that know the format from elsewhere (a declared display name or a
/// type hint) check it themselves first.
pub(crate) fn validate_fastq_path(
    path: &Path,
    interleaved: bool,
    config: &ValidationConfig,
) -> Result<Verdict> {
    let source = ReadSource::open(path)?;
    let verdict = FastqValidator::new(interleaved)
        .strip_blank_lines(config.strip_blank_lines)
        .validate(source)?;
    verdict.log(path);
    Ok(verdict)
}

/// Validate a single FASTA file
pub fn validate_fasta_file<P: AsRef<Path>>(path: P) -> Result<Verdict> {
    let path = path.as_ref();
    let source = ReadSource::open(path)?;
    format::require(path, None, None, ReadFormat::Fasta)?;
    let verdict = FastaValidator::new().validate(source)?;
    verdict.log(path);
    Ok(verdict)
}

/// Validate a FASTA file
pub fn validate_fasta(params: &ValidateFastaParams) -> Result<ValidationResult> {
    let verdict = validate_fasta_file(&params.path)?;
    Ok(ValidationResult {
        valid: verdict.is_valid(),
    })
}

/// Validate a batch of FASTQ files.
///
/// Every path and suffix is checked before any file is read, so a missing or
/// unsupported file aborts the call without doing any work. The files are then
/// validated independently on up to [`ValidationConfig::num_threads`] threads;
/// one invalid file does not affect the others, and the results follow the
/// order of `files`.
pub fn validate_fastq(
    files: &[ValidateFastqParams],
    config: &ValidationConfig,
) -> Result<Vec<FastqValidation>> {
    for file in files {
        resolve_path(&file.path)?;
        format::require(&file.path, None, None, ReadFormat::Fastq)?;
    }
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let num_threads = config.threads_for(files.len());
    let chunk_size = files.len().div_ceil(num_threads);
    log::debug!(
        "Validating {} FASTQ files on {num_threads} threads",
        files.len()
    );

    let verdicts: Vec<Result<Verdict>> = std::thread::scope(|scope| {
        let handles: Vec<_> = files
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|file| validate_fastq_path(&file.path, file.interleaved, config))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    });

    verdicts
        .into_iter()
        .map(|verdict| {
            verdict.map(|v| FastqValidation {
                validated: v.is_valid(),
            })
        })
        .collect()
}
