//! Format detection for read files
//!
//! The format of a file is inferred from, in order of precedence:
//!
//! 1. an explicit type hint (e.g. `fastq`, `fq.gz`),
//! 2. the suffix of a declared display name,
//! 3. the suffix of the file path itself.
//!
//! The first source that is present decides. A format suffix may be followed by a
//! compression suffix (`sample.fq.gz`), which is reported separately but never
//! changes the format.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::{error::Result, FileError};

/// Suffixes recognized as FASTA
const FASTA_SUFFIXES: [&str; 4] = ["fa", "fas", "fna", "fasta"];

/// Suffixes recognized as FASTQ
const FASTQ_SUFFIXES: [&str; 3] = ["fq", "fnq", "fastq"];

/// Suffixes recognized as gzip compression
const GZIP_SUFFIXES: [&str; 2] = ["gz", "gzip"];

/// Suffixes recognized as bzip2 compression
const BZIP2_SUFFIXES: [&str; 4] = ["bz", "bz2", "bzip", "bzip2"];

/// Plain text read formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadFormat {
    Fasta,
    Fastq,
}
impl ReadFormat {
    /// Upper case name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            Self::Fasta => "FASTA",
            Self::Fastq => "FASTQ",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        if FASTA_SUFFIXES.contains(&suffix) {
            Some(Self::Fasta)
        } else if FASTQ_SUFFIXES.contains(&suffix) {
            Some(Self::Fastq)
        } else {
            None
        }
    }
}
impl fmt::Display for ReadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compression declared by a file name suffix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Bzip2,
}
impl Compression {
    fn from_suffix(suffix: &str) -> Option<Self> {
        if GZIP_SUFFIXES.contains(&suffix) {
            Some(Self::Gzip)
        } else if BZIP2_SUFFIXES.contains(&suffix) {
            Some(Self::Bzip2)
        } else {
            None
        }
    }
}

/// Format and compression parsed from a name or type hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detected {
    pub format: ReadFormat,
    pub compression: Compression,
}

/// Classify a single name or type hint.
///
/// The name is split on `.`; a trailing compression suffix is peeled off and the
/// component before it must be a format suffix. Matching is case-insensitive, and
/// a bare hint such as `fastq` is its own suffix.
pub fn classify(name: &str) -> Option<Detected> {
    let lower = name.trim().to_ascii_lowercase();
    let mut parts: Vec<&str> = lower.split('.').collect();

    let compression = match parts.last().and_then(|s| Compression::from_suffix(s)) {
        Some(compression) => {
            parts.pop();
            compression
        }
        None => Compression::None,
    };

    parts
        .last()
        .and_then(|s| ReadFormat::from_suffix(s))
        .map(|format| Detected {
            format,
            compression,
        })
}

/// Infer the format of `path` from the highest precedence source available.
///
/// Empty hints and names are treated as absent.
pub fn detect(
    path: &Path,
    type_hint: Option<&str>,
    display_name: Option<&str>,
) -> std::result::Result<Detected, FileError> {
    let present = |s: Option<&str>| s.filter(|s| !s.trim().is_empty()).map(str::to_owned);
    let source = present(type_hint)
        .or_else(|| present(display_name))
        .or_else(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    classify(&source).ok_or_else(|| FileError::UnsupportedFormat {
        path: path.display().to_string(),
        expected: "supported read",
    })
}

/// Require that `path` is of the `expected` format, returning its declared compression.
pub fn require(
    path: &Path,
    type_hint: Option<&str>,
    display_name: Option<&str>,
    expected: ReadFormat,
) -> Result<Compression> {
    match detect(path, type_hint, display_name) {
        Ok(detected) if detected.format == expected => {
            log::debug!(
                "Detected {} ({:?}) for {}",
                detected.format,
                detected.compression,
                path.display()
            );
            Ok(detected.compression)
        }
        _ => Err(FileError::UnsupportedFormat {
            path: path.display().to_string(),
            expected: expected.name(),
        }
        .into()),
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::Error;

    #[test]
    fn test_fasta_suffixes() {
        for name in ["sample.fa", "sample.fas", "sample.fna", "sample.fasta", "S.FASTA"] {
            let detected = classify(name).unwrap();
            assert_eq!(detected.format, ReadFormat::Fasta, "{name}");
            assert_eq!(detected.compression, Compression::None);
        }
    }

    #[test]
    fn test_fastq_suffixes_with_compression() {
        let detected = classify("reads.fq.gz").unwrap();
        assert_eq!(detected.format, ReadFormat::Fastq);
        assert_eq!(detected.compression, Compression::Gzip);

        let detected = classify("reads.FNQ.Bz2").unwrap();
        assert_eq!(detected.format, ReadFormat::Fastq);
        assert_eq!(detected.compression, Compression::Bzip2);

        assert!(classify("reads.gz").is_none());
        assert!(classify("reads.gz.fq").is_some());
    }

    #[test]
    fn test_bare_hints() {
        assert_eq!(classify("fastq").unwrap().format, ReadFormat::Fastq);
        assert_eq!(classify("fastq.Gz").unwrap().compression, Compression::Gzip);
        assert!(classify("xls").is_none());
        assert!(classify("").is_none());
    }

    #[test]
    fn test_precedence() {
        let path = Path::new("data/upload_123");

        // no usable source
        assert!(detect(path, None, None).is_err());

        // display name beats the path
        let detected = detect(path, None, Some("reads.fastq")).unwrap();
        assert_eq!(detected.format, ReadFormat::Fastq);

        // empty hint falls through to the display name
        let detected = detect(path, Some(""), Some("genome.fa")).unwrap();
        assert_eq!(detected.format, ReadFormat::Fasta);

        // hint beats everything, even when it is unrecognized
        assert!(detect(Path::new("reads.fq"), Some("xls"), None).is_err());
        let detected = detect(Path::new("reads.txt"), Some("fq"), Some("x.txt")).unwrap();
        assert_eq!(detected.format, ReadFormat::Fastq);
    }

    #[test]
    fn test_require_names_the_file() {
        let err = require(Path::new("data/sample.txt"), None, None, ReadFormat::Fasta).unwrap_err();
        assert_eq!(err.to_string(), "File data/sample.txt is not a FASTA file");
        assert!(matches!(
            err,
            Error::FileError(FileError::UnsupportedFormat { .. })
        ));

        let err = require(Path::new("data/sample.fa"), None, None, ReadFormat::Fastq).unwrap_err();
        assert_eq!(err.to_string(), "File data/sample.fa is not a FASTQ file");
    }

    #[test]
    fn test_directory_dots_are_ignored() {
        let path = Path::new("runs/v1.fq/reads");
        assert!(detect(path, None, None).is_err());
    }
}
