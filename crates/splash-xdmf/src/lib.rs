//! libSplash to XDMF conversion engine.
//!
//! Walks the iteration group of one or more libSplash HDF5 containers,
//! groups the classified datasets by shape into geometry nodes and writes an
//! XDMF description that references the datasets in place.
//!
//! # Container layout
//!
//! ```text
//! /data/<iteration>/...          exactly one iteration group per file
//!     <dataset>  _class = 20     regular grid
//!     <dataset>  _class = 10     point set (poly)
//! ```
//!
//! Datasets of the same kind and shape share one XDMF grid. The engine only
//! sees containers through the [`Container`] trait; the HDF5 backend lives in
//! the `splash-reader` crate.

pub mod assembler;
pub mod builder;
pub mod cache;
pub mod container;
pub mod error;
pub mod model;
pub mod options;
pub mod paths;
pub mod session;
pub mod type_map;
pub mod walker;
pub mod xdmf;

use std::path::{Path, PathBuf};

use tracing::info;

pub use assembler::{output_targets, write_outputs, OutputDocument, OutputTargets};
pub use container::{AttrValue, Container, DatasetRef, Entry, MemoryContainer, NativeType, ScalarValue};
pub use error::{Diagnostic, XdmfError, XdmfResult};
pub use model::{Collection, GeometryKind, GeometryNode, XdmfDocument};
pub use options::ConvertOptions;
pub use session::{ConversionSession, IterationSummary, SkippedContainer};
pub use walker::Classification;

/// Outcome of a successful [`convert`] call.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// Files written, in target order
    pub outputs: Vec<PathBuf>,
    pub summaries: Vec<IterationSummary>,
    pub skipped: Vec<SkippedContainer>,
}

impl ConversionReport {
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.summaries.iter().flat_map(|s| s.diagnostics.iter())
    }
}

/// Convert `input` (or its whole series in time-series mode) to XDMF.
///
/// `open` turns a path into a container; each container is dropped before the
/// next one is opened. Nothing is written unless every step succeeds.
pub fn convert<C, F>(input: &Path, options: &ConvertOptions, open: F) -> XdmfResult<ConversionReport>
where
    C: Container,
    F: FnMut(&Path) -> XdmfResult<C>,
{
    if !input.exists() {
        return Err(XdmfError::MissingInput(input.to_path_buf()));
    }
    let targets = output_targets(input, options)?;

    let inputs = if options.time_series {
        paths::discover_series(input)?
    } else {
        vec![input.to_path_buf()]
    };
    info!(
        input = %input.display(),
        files = inputs.len(),
        time_series = options.time_series,
        "Starting conversion"
    );

    let mut session = ConversionSession::new(options.clone());
    session.run(&inputs, open)?;

    let documents = session.assemble(&targets);
    let outputs = write_outputs(&documents)?;

    Ok(ConversionReport {
        outputs,
        summaries: session.summaries().to_vec(),
        skipped: session.skipped().to_vec(),
    })
}
