//! Output assembly: decides the target files and groups harvested nodes into
//! collections.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{XdmfError, XdmfResult};
use crate::model::{Collection, GeometryKind, GeometryNode, IterationEntry, XdmfDocument};
use crate::options::{ConvertOptions, XMF_EXTENSION};
use crate::paths::common_name;
use crate::session::HarvestedIteration;
use crate::xdmf::write_document;

/// Where the output documents go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTargets {
    /// One document holding both kinds
    Merged(PathBuf),
    /// One document per kind
    Split { grid: PathBuf, poly: PathBuf },
}

/// A finished document and the file it is written to.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDocument {
    pub path: PathBuf,
    pub document: XdmfDocument,
}

/// Compute the output file(s) for a run starting at `input`.
///
/// The base path is the explicit output if given, otherwise `<common>.xmf`
/// for a time series or `<input>.xmf`. Split mode derives `<base>_grid.xmf`
/// and `<base>_poly.xmf` from it.
pub fn output_targets(input: &Path, options: &ConvertOptions) -> XdmfResult<OutputTargets> {
    options.validate()?;

    let input = input.to_string_lossy();
    let base = match &options.output {
        Some(output) => output.to_string_lossy().into_owned(),
        None if options.time_series => format!("{}{}", common_name(&input), XMF_EXTENSION),
        None => format!("{}{}", input, XMF_EXTENSION),
    };

    if !options.split {
        return Ok(OutputTargets::Merged(PathBuf::from(base)));
    }

    let stem = base
        .strip_suffix(XMF_EXTENSION)
        .ok_or_else(|| XdmfError::InvalidOutputPath {
            path: base.clone(),
            reason: format!("split output requires a '{}' suffix", XMF_EXTENSION),
        })?;

    Ok(OutputTargets::Split {
        grid: PathBuf::from(format!("{}_grid{}", stem, XMF_EXTENSION)),
        poly: PathBuf::from(format!("{}_poly{}", stem, XMF_EXTENSION)),
    })
}

/// Group the nodes of `kind` into a collection, or `None` if there are none.
fn build_collection(
    kind: GeometryKind,
    iterations: &[HarvestedIteration],
    temporal: bool,
) -> Option<Collection> {
    if temporal {
        let entries: Vec<IterationEntry> = iterations
            .iter()
            .filter(|it| !it.nodes(kind).is_empty())
            .map(|it| IterationEntry {
                name: format!("{}_{}", kind.prefix(), it.iteration),
                iteration: it.iteration.clone(),
                nodes: it.nodes(kind).to_vec(),
            })
            .collect();

        (!entries.is_empty()).then(|| Collection::Temporal {
            name: format!("{}Time", kind.prefix()),
            entries,
        })
    } else {
        let nodes: Vec<GeometryNode> = iterations
            .iter()
            .flat_map(|it| it.nodes(kind).iter().cloned())
            .collect();

        (!nodes.is_empty()).then(|| Collection::Spatial {
            name: format!("{}s", kind.prefix()),
            nodes,
        })
    }
}

/// Build the document(s) for `targets`.
///
/// Split mode always yields both documents, even when one kind is empty.
pub fn assemble(
    iterations: &[HarvestedIteration],
    options: &ConvertOptions,
    targets: &OutputTargets,
) -> Vec<OutputDocument> {
    let collection = |kind| build_collection(kind, iterations, options.time_series);

    match targets {
        OutputTargets::Merged(path) => vec![OutputDocument {
            path: path.clone(),
            document: XdmfDocument {
                collections: GeometryKind::ALL
                    .into_iter()
                    .filter_map(collection)
                    .collect(),
            },
        }],
        OutputTargets::Split { grid, poly } => [(grid, GeometryKind::Grid), (poly, GeometryKind::Poly)]
            .into_iter()
            .map(|(path, kind)| OutputDocument {
                path: path.clone(),
                document: XdmfDocument {
                    collections: collection(kind).into_iter().collect(),
                },
            })
            .collect(),
    }
}

/// Serialize every document, then write the files.
///
/// All documents are serialized before the first file is created. If any file
/// cannot be written, the files already written by this call are removed
/// again, so a failed run leaves no partial output behind.
pub fn write_outputs(documents: &[OutputDocument]) -> XdmfResult<Vec<PathBuf>> {
    let rendered = documents
        .iter()
        .map(|doc| Ok((doc.path.as_path(), write_document(&doc.document, Vec::new())?)))
        .collect::<XdmfResult<Vec<_>>>()?;

    let mut written: Vec<PathBuf> = Vec::with_capacity(rendered.len());
    for (path, bytes) in rendered {
        if let Err(e) = write_file(path, &bytes) {
            warn!(path = %path.display(), error = %e, "Failed to write XDMF file");
            for done in &written {
                if let Err(cleanup) = fs::remove_file(done) {
                    warn!(path = %done.display(), error = %cleanup, "Failed to remove partial output");
                }
            }
            return Err(e.into());
        }
        info!(path = %path.display(), "Created XDMF file");
        written.push(path.to_path_buf());
    }
    Ok(written)
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(bytes)?;
    file.flush()
}
