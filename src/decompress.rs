//! Transparent decompression of read files
//!
//! Compression is detected from the leading magic bytes of the stream rather than
//! from the file name: gzip (`1F 8B`) and bzip2 (`BZh`). Anything else is passed
//! through unchanged. Decoding is lazy, only happening as the caller reads.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use bzip2::bufread::MultiBzDecoder;
use flate2::bufread::MultiGzDecoder;

use crate::{error::Result, DecodeError, Error, FileError};

/// Magic bytes of a gzip member
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Magic bytes of a bzip2 stream
const BZIP2_MAGIC: [u8; 3] = *b"BZh";

/// Buffer size used for both input and output files
pub const BUFFER_SIZE: usize = 1 << 16;

/// Compression codec detected from the stream contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Plain,
    Gzip,
    Bzip2,
}
impl Codec {
    /// Detect the codec from the first bytes of a stream
    pub fn sniff(head: &[u8]) -> Self {
        if head.starts_with(&GZIP_MAGIC) {
            Self::Gzip
        } else if head.starts_with(&BZIP2_MAGIC) {
            Self::Bzip2
        } else {
            Self::Plain
        }
    }

    pub fn is_compressed(self) -> bool {
        !matches!(self, Self::Plain)
    }
}

/// A buffered stream that is either plain text or decoded on the fly
pub enum Decompressed<R: BufRead> {
    Plain(R),
    Gzip(BufReader<MultiGzDecoder<R>>),
    Bzip2(BufReader<MultiBzDecoder<R>>),
}
impl<R: BufRead> Decompressed<R> {
    /// Wrap `inner`, choosing a decoder from its leading bytes.
    ///
    /// Only the already buffered head of the stream is inspected; nothing is
    /// consumed.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let codec = Codec::sniff(inner.fill_buf()?);
        Ok(match codec {
            Codec::Plain => Self::Plain(inner),
            Codec::Gzip => Self::Gzip(BufReader::with_capacity(
                BUFFER_SIZE,
                MultiGzDecoder::new(inner),
            )),
            Codec::Bzip2 => Self::Bzip2(BufReader::with_capacity(
                BUFFER_SIZE,
                MultiBzDecoder::new(inner),
            )),
        })
    }

    pub fn codec(&self) -> Codec {
        match self {
            Self::Plain(_) => Codec::Plain,
            Self::Gzip(_) => Codec::Gzip,
            Self::Bzip2(_) => Codec::Bzip2,
        }
    }
}
impl<R: BufRead> Read for Decompressed<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(r) => r.read(buf),
            Self::Gzip(r) => r.read(buf),
            Self::Bzip2(r) => r.read(buf),
        }
    }
}
impl<R: BufRead> BufRead for Decompressed<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Self::Plain(r) => r.fill_buf(),
            Self::Gzip(r) => r.fill_buf(),
            Self::Bzip2(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Self::Plain(r) => r.consume(amt),
            Self::Gzip(r) => r.consume(amt),
            Self::Bzip2(r) => r.consume(amt),
        }
    }
}

/// A read file opened through the decompression adapter.
///
/// The file descriptor is released when the source is dropped, on every exit path.
pub struct ReadSource {
    path: PathBuf,
    inner: Decompressed<BufReader<File>>,
}
impl ReadSource {
    /// Resolve and open `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = resolve_path(path.as_ref())?;
        let handle = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FileError::FileNotFound(path.display().to_string()).into(),
            _ => Error::from(e),
        })?;
        let inner = Decompressed::new(BufReader::with_capacity(BUFFER_SIZE, handle))?;
        log::debug!("Opened {} ({:?})", path.display(), inner.codec());
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn codec(&self) -> Codec {
        self.inner.codec()
    }
}
impl Read for ReadSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let codec = self.inner.codec();
        let path = &self.path;
        self.inner
            .read(buf)
            .map_err(|e| tag_decoder_error(codec, path, e))
    }
}
impl BufRead for ReadSource {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        let codec = self.inner.codec();
        let path = &self.path;
        self.inner
            .fill_buf()
            .map_err(|e| tag_decoder_error(codec, path, e))
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
    }
}

/// Attach the file path to malformed data coming out of a decoder.
///
/// The payload is unwrapped again by `From<io::Error> for Error`, so it survives
/// any number of generic readers stacked on top of the source.
fn tag_decoder_error(codec: Codec, path: &Path, err: io::Error) -> io::Error {
    let decoder_failure = matches!(
        err.kind(),
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof
    );
    if !codec.is_compressed() || !decoder_failure {
        return err;
    }
    let kind = err.kind();
    io::Error::new(
        kind,
        DecodeError::CorruptArchive {
            path: path.display().to_string(),
            source: err,
        },
    )
}

/// Ensure `path` names an existing regular file.
///
/// Empty paths, missing paths, and anything that is not a regular file are all
/// reported as [`FileError::FileNotFound`] naming the path as given.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() || !path.is_file() {
        return Err(FileError::FileNotFound(path.display().to_string()).into());
    }
    Ok(path.to_path_buf())
}

/// Create a buffered output file
pub fn create_output<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    let handle = File::create(path.as_ref())?;
    Ok(BufWriter::with_capacity(BUFFER_SIZE, handle))
}
