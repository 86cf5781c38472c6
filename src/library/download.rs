use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{
    DownloadedLibrary, FileLayout, LibraryStore, ObjectRef, ReadsFiles, StoredLibrary, Tern,
};
use crate::{
    convert::{deinterleave_file, interleave_files},
    error::Result,
    reader::normalize_file,
    ParamError,
};

/// Parameters of a library download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadParams {
    /// Libraries to fetch, in processing order
    pub read_libraries: Vec<ObjectRef>,

    /// Requested layout of paired-end output: `True` for one interleaved file,
    /// `False` for forward and reverse files, `Unknown` to keep the stored layout
    pub interleaved: Tern,

    /// Directory receiving the output files
    pub output_dir: PathBuf,
}
impl DownloadParams {
    pub fn new<P: Into<PathBuf>>(read_libraries: Vec<ObjectRef>, output_dir: P) -> Self {
        Self {
            read_libraries,
            interleaved: Tern::Unknown,
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn interleaved(mut self, interleaved: Tern) -> Self {
        self.interleaved = interleaved;
        self
    }
}

/// Output path `<output_dir>/<ref with '/' replaced>.<tag>.fastq`
fn output_path(output_dir: &Path, reference: &ObjectRef, tag: &str) -> PathBuf {
    let stem = reference.to_string().replace('/', "_");
    output_dir.join(format!("{stem}.{tag}.fastq"))
}

/// Deliver a stored library to `output_dir` in the requested layout.
///
/// Output files are always plain text with blank lines dropped, whether or not
/// they were converted. A conversion only happens when the requested layout
/// differs from the stored one:
///
/// | stored        | requested         | delivered                 |
/// |---------------|-------------------|---------------------------|
/// | `single`      | any               | `.single.fastq`           |
/// | `paired`      | `True`            | `.inter.fastq`            |
/// | `paired`      | `False`/`Unknown` | `.fwd.fastq`+`.rev.fastq` |
/// | `interleaved` | `False`           | `.fwd.fastq`+`.rev.fastq` |
/// | `interleaved` | `True`/`Unknown`  | `.inter.fastq`            |
pub fn assemble(
    reference: &ObjectRef,
    library: &StoredLibrary,
    interleaved: Tern,
    output_dir: &Path,
) -> Result<DownloadedLibrary> {
    let out = |tag: &str| output_path(output_dir, reference, tag);
    let fwd = &library.fwd;
    let rev_name = library.rev.as_ref().map(|rev| rev.name.clone());
    let paired_rev = || {
        library.rev.as_ref().ok_or_else(|| {
            ParamError::invalid(format!(
                "Paired library {reference} has no reverse reads file"
            ))
        })
    };

    let (fwd_path, rev_path, layout) = match (library.layout, interleaved) {
        (FileLayout::Single, _) => {
            let path = out("single");
            normalize_file(&fwd.path, &path)?;
            (path, None, FileLayout::Single)
        }
        (FileLayout::Paired, Tern::True) => {
            let outcome = interleave_files(&fwd.path, &paired_rev()?.path, out("inter"))?;
            (outcome.fwd, None, outcome.layout)
        }
        (FileLayout::Paired, _) => {
            let (fwd_out, rev_out) = (out("fwd"), out("rev"));
            normalize_file(&fwd.path, &fwd_out)?;
            normalize_file(&paired_rev()?.path, &rev_out)?;
            (fwd_out, Some(rev_out), FileLayout::Paired)
        }
        (FileLayout::Interleaved, Tern::False) => {
            let outcome = deinterleave_file(&fwd.path, out("fwd"), out("rev"))?;
            (outcome.fwd, outcome.rev, outcome.layout)
        }
        (FileLayout::Interleaved, _) => {
            let path = out("inter");
            normalize_file(&fwd.path, &path)?;
            (path, None, FileLayout::Interleaved)
        }
    };

    let mut metadata = library.metadata.clone();
    if library.layout == FileLayout::Single {
        metadata.read_orientation_outward = Tern::Unknown;
    }

    log::debug!(
        "Delivered {} library {reference} as {layout}",
        library.layout
    );
    Ok(DownloadedLibrary {
        files: ReadsFiles {
            fwd: fwd_path,
            fwd_name: fwd.name.clone(),
            rev: rev_path,
            rev_name,
            otype: library.layout,
            layout,
        },
        reference: reference.to_string(),
        metadata,
    })
}

/// Fetch and deliver every requested library, keyed by its reference
pub fn download_reads<S: LibraryStore + ?Sized>(
    params: &DownloadParams,
    store: &S,
) -> Result<BTreeMap<String, DownloadedLibrary>> {
    if params.read_libraries.is_empty() {
        return Err(ParamError::invalid(
            "At least one read library must be provided",
        ));
    }
    std::fs::create_dir_all(&params.output_dir)?;

    let mut delivered = BTreeMap::new();
    for reference in &params.read_libraries {
        let library = store.get(reference)?;
        let downloaded = assemble(reference, &library, params.interleaved, &params.output_dir)?;
        delivered.insert(reference.to_string(), downloaded);
    }
    log::info!(
        "Downloaded {} read libraries to {}",
        delivered.len(),
        params.output_dir.display()
    );
    Ok(delivered)
}
