/// Custom Result type for readsutils operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the readsutils library, encompassing all fatal cases
/// that can occur while validating, converting, or assembling read files.
///
/// Structural invalidity of a FASTA/FASTQ file is *not* an error: it is reported
/// as `valid == false` by the validators.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors resolving or classifying input files
    FileError(#[from] FileError),
    /// Errors decoding compressed input streams
    DecodeError(#[from] DecodeError),
    /// Errors that occur while interleaving or deinterleaving reads
    ConvertError(#[from] ConvertError),
    /// Caller-level contract violations
    ParamError(#[from] ParamError),
    /// Errors reported by the external library store
    StoreError(#[from] StoreError),
    /// Standard I/O errors from the Rust standard library
    IoError(std::io::Error),
}

/// I/O errors carrying a [`DecodeError`] payload are unwrapped, so that a corrupt
/// archive surfaces as such no matter how many readers it passed through.
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        if !err.get_ref().is_some_and(|inner| inner.is::<DecodeError>()) {
            return Self::IoError(err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<DecodeError>()) {
            Some(Ok(decode)) => Self::DecodeError(*decode),
            Some(Err(inner)) => Self::IoError(std::io::Error::new(kind, inner)),
            None => Self::IoError(kind.into()),
        }
    }
}

/// Errors resolving input paths and their formats
#[derive(thiserror::Error, Debug)]
pub enum FileError {
    /// The path is empty, missing, or not a regular file
    ///
    /// # Arguments
    /// * `String` - The path exactly as provided by the caller
    #[error("No such file: {0}")]
    FileNotFound(String),

    /// The path (or its declared name or type hint) does not carry a recognized suffix
    ///
    /// # Fields
    /// * `path` - The path exactly as provided by the caller
    /// * `expected` - The name of the expected format (`FASTA` or `FASTQ`)
    #[error("File {path} is not a {expected} file")]
    UnsupportedFormat { path: String, expected: &'static str },
}

/// Errors raised while decompressing a stream
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// The gzip or bzip2 stream could not be decoded
    #[error("Corrupt compressed file {path}: {source}")]
    CorruptArchive {
        path: String,
        source: std::io::Error,
    },
}

/// Errors raised by the interleave/deinterleave engine
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    /// The forward and reverse streams do not hold the same number of records
    ///
    /// # Fields
    /// * `forward` - Records observed on the forward side
    /// * `reverse` - Records observed on the reverse side
    #[error("Forward and reverse reads differ in record count ({forward} != {reverse})")]
    MismatchedPairCount { forward: usize, reverse: usize },

    /// The stream ended part-way through a four-line record
    ///
    /// # Fields
    /// * `path` - The stream being converted
    /// * `record` - Zero-based index of the incomplete record
    #[error("File {path} ends inside record {record}")]
    TruncatedRecord { path: String, record: usize },
}

/// Errors in caller supplied parameters
#[derive(thiserror::Error, Debug)]
pub enum ParamError {
    /// A required parameter is missing or a value is out of range
    #[error("{0}")]
    InvalidParameter(String),

    /// A file submitted for upload failed FASTQ validation
    #[error("Invalid FASTQ file {path}")]
    InvalidReads { path: String },

    /// A workspace reference is not of the form `wsid/objid/version`
    #[error("Invalid object reference: {0}")]
    InvalidRef(String),
}

/// Errors reported by a [`LibraryStore`](crate::LibraryStore)
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// No object is stored under the given reference
    #[error("There is no object with reference {0}")]
    ObjectNotFound(String),
}

impl ParamError {
    pub(crate) fn invalid(message: impl Into<String>) -> Error {
        Self::InvalidParameter(message.into()).into()
    }
}
