//! # readsutils
//!
//! Streaming validation and conversion of sequencing read files.
//!
//! The crate covers the file-level work behind a read library service:
//!
//! * [`format`] detects FASTA/FASTQ files (and their compression) from a type
//!   hint, a declared display name, or the file name.
//! * [`decompress`] opens files through a gzip/bzip2 adapter chosen from the
//!   leading magic bytes.
//! * [`FastaValidator`] and [`FastqValidator`] check the record grammar in a
//!   single streaming pass; an invalid file yields `valid == false`, not an error.
//! * [`convert`] interleaves and deinterleaves mate pairs byte for byte.
//! * [`library`] packages files and metadata for upload to, and download from,
//!   a [`LibraryStore`].
//!
//! ## Validating a stream
//!
//! ```
//! use std::io::Cursor;
//! use readsutils::{FastqValidator, Verdict, Violation};
//!
//! # fn main() -> readsutils::Result<()> {
//! let validator = FastqValidator::new(false);
//!
//! let verdict = validator.validate(Cursor::new("@r1\nACGT\n+\nIIII\n"))?;
//! assert_eq!(verdict, Verdict::Valid { records: 1 });
//!
//! let verdict = validator.validate(Cursor::new("@r1\nACGT\n+\nIII\n"))?;
//! assert!(matches!(
//!     verdict,
//!     Verdict::Invalid(Violation::QualityLength { line: 4, .. })
//! ));
//! # Ok(())
//! # }
//! ```
//!
//! ## Deinterleaving a stream
//!
//! ```
//! use std::io::Cursor;
//! use readsutils::{convert, FastqReader, FastqWriter};
//!
//! # fn main() -> readsutils::Result<()> {
//! let data = "@a/1\nAC\n+\nII\n@a/2\nGT\n+\nJJ\n";
//! let mut reader = FastqReader::new(Cursor::new(data));
//! let mut fwd = FastqWriter::new(Vec::new());
//! let mut rev = FastqWriter::new(Vec::new());
//!
//! let pairs = convert::deinterleave(&mut reader, &mut fwd, &mut rev)?;
//! assert_eq!(pairs, 1);
//! assert_eq!(fwd.into_inner(), b"@a/1\nAC\n+\nII\n");
//! assert_eq!(rev.into_inner(), b"@a/2\nGT\n+\nJJ\n");
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod decompress;
mod error;
pub mod format;
pub mod library;
mod reader;
pub mod record;
pub mod validate;
mod writer;

pub use error::{ConvertError, DecodeError, Error, FileError, ParamError, Result, StoreError};
pub use library::{
    DownloadParams, DownloadedLibrary, FileLayout, LibraryStore, ObjectRef, ReadLibrary,
    SaveTarget, Tern, UploadParams,
};
pub use reader::{normalize_file, strip_blank_lines, FastqReader, LineReader};
pub use record::RefRecord;
pub use validate::{
    validate_fasta, validate_fastq, FastaValidator, FastqValidation, FastqValidator,
    ValidateFastaParams, ValidateFastqParams, ValidationConfig, ValidationResult, Verdict,
    Violation,
};
pub use writer::FastqWriter;
