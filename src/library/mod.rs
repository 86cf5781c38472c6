//! Read libraries: the packaging of validated read files with their metadata
//!
//! A library holds one file (single-end or interleaved reads) or two files
//! (forward and reverse mates) plus sequencing metadata that is carried through
//! opaquely. Libraries are persisted by a [`LibraryStore`]; this module only
//! decides which conversions are needed on the way in and out.

mod download;
mod store;
mod upload;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{error::Result, ParamError};

pub use download::{assemble, download_reads, DownloadParams};
pub use store::{LibraryStore, ObjectId, ObjectRef, SaveTarget, WorkspaceId};
pub use upload::{prepare_upload, upload_reads, UploadParams, UploadParamsBuilder};

#[cfg(test)]
pub(crate) use store::MemoryStore;

/// How the reads of a library are laid out on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileLayout {
    /// One file of single-end reads
    Single,
    /// Forward and reverse mates in two files
    Paired,
    /// Forward and reverse mates alternating in one file
    Interleaved,
}
impl FileLayout {
    pub fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Paired => "paired",
            Self::Interleaved => "interleaved",
        }
    }

    pub fn is_paired_end(self) -> bool {
        !matches!(self, Self::Single)
    }
}
impl fmt::Display for FileLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A three-valued flag where "not known" is distinct from `false`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tern {
    True,
    False,
    #[default]
    Unknown,
}
impl Tern {
    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Unknown => None,
        }
    }
}
impl From<bool> for Tern {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}
impl From<Option<bool>> for Tern {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Unknown, Self::from)
    }
}
impl FromStr for Tern {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Self::True),
            "false" | "0" => Ok(Self::False),
            "" | "null" => Ok(Self::Unknown),
            other => Err(ParamError::invalid(format!(
                "Illegal value for a true/false/unknown flag: {other}"
            ))),
        }
    }
}
impl Serialize for Tern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

/// Sequencing metadata carried alongside the read files
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LibraryMetadata {
    pub single_genome: Tern,
    pub read_orientation_outward: Tern,
    pub sequencing_tech: Option<String>,
    pub strain: Option<Value>,
    pub source: Option<Value>,
    pub insert_size_mean: Option<f64>,
    pub insert_size_std_dev: Option<f64>,
    pub read_count: Option<u64>,
    pub read_size: Option<u64>,
    pub gc_content: Option<f64>,
}

/// A read file staged for storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHandle {
    pub path: PathBuf,
    pub display_name: String,
    pub size_bytes: u64,
    pub encoding: String,
    pub format: String,
}

/// A validated library ready to be saved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadLibrary {
    /// Layout of the uploaded files.
    ///
    /// Uploads are stored without conversion, so this single value is both the
    /// delivered `type` here and the `otype` reported by later downloads.
    #[serde(rename = "type")]
    pub layout: FileLayout,
    pub fwd: FileHandle,
    pub rev: Option<FileHandle>,
    pub metadata: LibraryMetadata,
}

/// A file as held by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub name: String,
}

/// A library as fetched from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredLibrary {
    pub layout: FileLayout,
    pub fwd: StoredFile,
    pub rev: Option<StoredFile>,
    pub metadata: LibraryMetadata,
}

/// Files of a downloaded library
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadsFiles {
    pub fwd: PathBuf,
    pub fwd_name: String,
    pub rev: Option<PathBuf>,
    pub rev_name: Option<String>,

    /// Layout of the library as stored
    pub otype: FileLayout,

    /// Layout of the files delivered
    #[serde(rename = "type")]
    pub layout: FileLayout,
}

/// A library delivered to the local filesystem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadedLibrary {
    pub files: ReadsFiles,

    #[serde(rename = "ref")]
    pub reference: String,

    #[serde(flatten)]
    pub metadata: LibraryMetadata,
}
