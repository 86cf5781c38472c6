use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{
    FileHandle, FileLayout, LibraryMetadata, LibraryStore, ObjectId, ObjectRef, ReadLibrary,
    SaveTarget, Tern, WorkspaceId,
};
use crate::{
    decompress::resolve_path,
    error::Result,
    format::{self, ReadFormat},
    validate::{validate_fastq_path, ValidationConfig},
    ParamError,
};

/// Encoding recorded for every uploaded read file
const ENCODING: &str = "ascii";

/// Format tag recorded for every uploaded read file
const FORMAT_TAG: &str = "fq";

/// Validated parameters of a read library upload
///
/// Built through [`UploadParamsBuilder`], which enforces the required fields.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadParams {
    /// Forward (or only) read file
    pub fwd_file: PathBuf,

    /// Reverse read file for paired libraries
    pub rev_file: Option<PathBuf>,

    /// Display name of the forward file, defaults to its file name
    pub fwd_name: Option<String>,

    /// Display name of the reverse file, defaults to its file name
    pub rev_name: Option<String>,

    pub sequencing_tech: String,
    pub target: SaveTarget,
    pub single_genome: bool,

    /// Whether `fwd_file` holds interleaved mates; always `false` with a reverse file
    pub interleaved: bool,

    pub read_orientation_outward: bool,
    pub insert_size_mean: Option<f64>,
    pub insert_size_std_dev: Option<f64>,
    pub strain: Option<Value>,
    pub source: Option<Value>,
}
impl UploadParams {
    pub fn builder() -> UploadParamsBuilder {
        UploadParamsBuilder::new()
    }

    /// Layout of the library these parameters describe
    pub fn layout(&self) -> FileLayout {
        if self.rev_file.is_some() {
            FileLayout::Paired
        } else if self.interleaved {
            FileLayout::Interleaved
        } else {
            FileLayout::Single
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UploadParamsBuilder {
    fwd_file: Option<PathBuf>,
    rev_file: Option<PathBuf>,
    fwd_name: Option<String>,
    rev_name: Option<String>,
    sequencing_tech: Option<String>,
    wsid: Option<u64>,
    wsname: Option<String>,
    objid: Option<u64>,
    name: Option<String>,
    single_genome: Option<bool>,
    interleaved: Option<bool>,
    read_orientation_outward: Option<bool>,
    insert_size_mean: Option<f64>,
    insert_size_std_dev: Option<f64>,
    strain: Option<Value>,
    source: Option<Value>,
}
impl UploadParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn fwd_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.fwd_file = Some(path.into());
        self
    }
    #[must_use]
    pub fn rev_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.rev_file = Some(path.into());
        self
    }
    #[must_use]
    pub fn fwd_name(mut self, name: impl Into<String>) -> Self {
        self.fwd_name = Some(name.into());
        self
    }
    #[must_use]
    pub fn rev_name(mut self, name: impl Into<String>) -> Self {
        self.rev_name = Some(name.into());
        self
    }
    #[must_use]
    pub fn sequencing_tech(mut self, tech: impl Into<String>) -> Self {
        self.sequencing_tech = Some(tech.into());
        self
    }
    #[must_use]
    pub fn wsid(mut self, wsid: u64) -> Self {
        self.wsid = Some(wsid);
        self
    }
    #[must_use]
    pub fn wsname(mut self, wsname: impl Into<String>) -> Self {
        self.wsname = Some(wsname.into());
        self
    }
    #[must_use]
    pub fn objid(mut self, objid: u64) -> Self {
        self.objid = Some(objid);
        self
    }
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    #[must_use]
    pub fn single_genome(mut self, single_genome: bool) -> Self {
        self.single_genome = Some(single_genome);
        self
    }
    #[must_use]
    pub fn interleaved(mut self, interleaved: bool) -> Self {
        self.interleaved = Some(interleaved);
        self
    }
    #[must_use]
    pub fn read_orientation_outward(mut self, outward: bool) -> Self {
        self.read_orientation_outward = Some(outward);
        self
    }
    #[must_use]
    pub fn insert_size_mean(mut self, mean: f64) -> Self {
        self.insert_size_mean = Some(mean);
        self
    }
    #[must_use]
    pub fn insert_size_std_dev(mut self, std_dev: f64) -> Self {
        self.insert_size_std_dev = Some(std_dev);
        self
    }
    #[must_use]
    pub fn strain(mut self, strain: Value) -> Self {
        self.strain = Some(strain);
        self
    }
    #[must_use]
    pub fn source(mut self, source: Value) -> Self {
        self.source = Some(source);
        self
    }

    pub fn build(self) -> Result<UploadParams> {
        let Some(fwd_file) = self.fwd_file.filter(|p| !p.as_os_str().is_empty()) else {
            return Err(ParamError::invalid("No reads file provided"));
        };
        let Some(sequencing_tech) = self.sequencing_tech.filter(|t| !t.trim().is_empty()) else {
            return Err(ParamError::invalid(
                "The sequencing technology must be provided",
            ));
        };
        let workspace = match (self.wsid, self.wsname) {
            (Some(wsid), None) => WorkspaceId::Id(wsid),
            (None, Some(wsname)) if !wsname.is_empty() => WorkspaceId::Name(wsname),
            _ => {
                return Err(ParamError::invalid(
                    "Exactly one of the workspace ID or name must be provided",
                ))
            }
        };
        let object = match (self.objid, self.name) {
            (Some(objid), None) => ObjectId::Id(objid),
            (None, Some(name)) if !name.is_empty() => ObjectId::Name(name),
            _ => {
                return Err(ParamError::invalid(
                    "Exactly one of the object ID or name must be provided",
                ))
            }
        };
        for (field, value) in [
            ("insert_size_mean", self.insert_size_mean),
            ("insert_size_std_dev", self.insert_size_std_dev),
        ] {
            if value.is_some_and(|v| v <= 0.0 || v.is_nan()) {
                return Err(ParamError::invalid(format!("{field} must be > 0")));
            }
        }

        let interleaved = self.rev_file.is_none() && self.interleaved.unwrap_or(false);
        Ok(UploadParams {
            fwd_file,
            rev_file: self.rev_file,
            fwd_name: self.fwd_name,
            rev_name: self.rev_name,
            sequencing_tech,
            target: SaveTarget { workspace, object },
            single_genome: self.single_genome.unwrap_or(true),
            interleaved,
            read_orientation_outward: self.read_orientation_outward.unwrap_or(false),
            insert_size_mean: self.insert_size_mean,
            insert_size_std_dev: self.insert_size_std_dev,
            strain: self.strain,
            source: self.source,
        })
    }
}

/// Check a single read file and describe it for storage
fn stage_file(path: &Path, display_name: Option<&str>, interleaved: bool) -> Result<FileHandle> {
    let path = resolve_path(path)?;
    format::require(&path, None, display_name, ReadFormat::Fastq)?;

    let verdict = validate_fastq_path(&path, interleaved, &ValidationConfig::default())?;
    if !verdict.is_valid() {
        return Err(ParamError::InvalidReads {
            path: path.display().to_string(),
        }
        .into());
    }

    let display_name = match display_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    Ok(FileHandle {
        size_bytes: std::fs::metadata(&path)?.len(),
        path,
        display_name,
        encoding: ENCODING.to_string(),
        format: FORMAT_TAG.to_string(),
    })
}

/// Validate the files of an upload and package them as a [`ReadLibrary`].
///
/// A paired upload validates both files as single-direction reads; otherwise the
/// forward file is validated against the declared interleaving. Orientation and
/// insert sizes only apply to paired-end libraries and are dropped otherwise.
pub fn prepare_upload(params: &UploadParams) -> Result<ReadLibrary> {
    let layout = params.layout();
    let fwd = stage_file(
        &params.fwd_file,
        params.fwd_name.as_deref(),
        params.interleaved,
    )?;
    let rev = params
        .rev_file
        .as_deref()
        .map(|path| stage_file(path, params.rev_name.as_deref(), false))
        .transpose()?;

    let paired_end = layout.is_paired_end();
    let metadata = LibraryMetadata {
        single_genome: params.single_genome.into(),
        read_orientation_outward: if paired_end {
            params.read_orientation_outward.into()
        } else {
            Tern::Unknown
        },
        sequencing_tech: Some(params.sequencing_tech.clone()),
        strain: params.strain.clone(),
        source: params.source.clone(),
        insert_size_mean: params.insert_size_mean.filter(|_| paired_end),
        insert_size_std_dev: params.insert_size_std_dev.filter(|_| paired_end),
        ..LibraryMetadata::default()
    };

    log::debug!("Prepared {layout} library from {}", fwd.path.display());
    Ok(ReadLibrary {
        layout,
        fwd,
        rev,
        metadata,
    })
}

/// Validate and save a new read library, returning its reference
pub fn upload_reads<S: LibraryStore + ?Sized>(
    params: &UploadParams,
    store: &mut S,
) -> Result<ObjectRef> {
    let library = prepare_upload(params)?;
    let reference = store.save(&params.target, &library)?;
    log::info!("Saved {} library as {reference}", library.layout);
    Ok(reference)
}
