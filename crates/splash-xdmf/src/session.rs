//! Conversion session: drives one parse pass per container and collects the
//! harvested geometry nodes.
//!
//! The session owns all mutable state of a run: the per-pass geometry caches
//! and the nodes harvested so far. Containers are borrowed for a single pass
//! and dropped (closed) before the next one is opened.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::assembler::{assemble, OutputDocument, OutputTargets};
use crate::cache::GeometryCaches;
use crate::container::{join_path, Container, Entry};
use crate::error::{Diagnostic, XdmfError, XdmfResult};
use crate::model::{GeometryKind, GeometryNode};
use crate::options::ConvertOptions;
use crate::paths::{reference_filename, DATA_GROUP};
use crate::walker::{TreeWalker, WalkStats};

/// Nodes harvested from one container.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestedIteration {
    pub source: PathBuf,
    pub iteration: String,
    pub grids: Vec<GeometryNode>,
    pub polys: Vec<GeometryNode>,
}

impl HarvestedIteration {
    pub fn nodes(&self, kind: GeometryKind) -> &[GeometryNode] {
        match kind {
            GeometryKind::Grid => &self.grids,
            GeometryKind::Poly => &self.polys,
        }
    }
}

/// What a single container contributed.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationSummary {
    pub source: PathBuf,
    pub iteration: String,
    pub grid_nodes: usize,
    pub poly_nodes: usize,
    pub attributes: usize,
    /// An earlier container of this run already used the same iteration id
    pub repeated_iteration: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: WalkStats,
}

/// A container whose contribution was withheld.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedContainer {
    pub source: PathBuf,
    pub reason: String,
}

/// State of one conversion run.
#[derive(Debug)]
pub struct ConversionSession {
    options: ConvertOptions,
    caches: GeometryCaches,
    iterations: Vec<HarvestedIteration>,
    summaries: Vec<IterationSummary>,
    skipped: Vec<SkippedContainer>,
}

impl ConversionSession {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            caches: GeometryCaches::default(),
            iterations: Vec::new(),
            summaries: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn iterations(&self) -> &[HarvestedIteration] {
        &self.iterations
    }

    pub fn summaries(&self) -> &[IterationSummary] {
        &self.summaries
    }

    pub fn skipped(&self) -> &[SkippedContainer] {
        &self.skipped
    }

    /// Run one parse pass over `container`, read from `source`.
    ///
    /// Fails without keeping any partial result if the container has no
    /// `/data` group or `/data` does not hold exactly one iteration group.
    pub fn process<C: Container + ?Sized>(
        &mut self,
        source: &Path,
        container: &C,
    ) -> XdmfResult<IterationSummary> {
        self.caches.clear();

        let file = source.display().to_string();
        let filename = reference_filename(source, self.options.full_paths)?;
        let data_root = join_path("/", DATA_GROUP);

        let entries = container
            .members(&data_root)?
            .ok_or_else(|| XdmfError::MissingDataRoot { file: file.clone() })?;

        let groups: Vec<String> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Group(name) => Some(name),
                Entry::Dataset(_) => None,
            })
            .collect();

        let iteration = match groups.as_slice() {
            [single] => single.clone(),
            _ => {
                return Err(XdmfError::IterationCount {
                    file,
                    found: groups.len(),
                })
            }
        };

        info!(file = %file, iteration = %iteration, "Processing container");

        let repeated_iteration = self.iterations.iter().any(|it| it.iteration == iteration);
        if repeated_iteration {
            warn!(
                file = %file,
                iteration = %iteration,
                "Iteration already harvested from another container; node names will repeat"
            );
        }

        let mut walker = TreeWalker::new(container, &filename, &mut self.caches);
        let walked = walker.walk(&join_path(&data_root, &iteration), 1);
        let (diagnostics, stats) = walker.finish();
        if let Err(e) = walked {
            self.caches.clear();
            return Err(e);
        }

        let harvested = self.harvest(source, &iteration);
        let summary = IterationSummary {
            source: source.to_path_buf(),
            iteration,
            grid_nodes: harvested.grids.len(),
            poly_nodes: harvested.polys.len(),
            attributes: harvested
                .grids
                .iter()
                .chain(harvested.polys.iter())
                .map(|n| n.attributes.len())
                .sum(),
            repeated_iteration,
            diagnostics,
            stats,
        };

        self.iterations.push(harvested);
        self.summaries.push(summary.clone());
        Ok(summary)
    }

    /// Move the cached nodes into a named, time-stamped iteration record.
    fn harvest(&mut self, source: &Path, iteration: &str) -> HarvestedIteration {
        let mut harvested = HarvestedIteration {
            source: source.to_path_buf(),
            iteration: iteration.to_string(),
            grids: Vec::new(),
            polys: Vec::new(),
        };

        for kind in GeometryKind::ALL {
            let nodes: Vec<GeometryNode> = self
                .caches
                .for_kind_mut(kind)
                .drain()
                .enumerate()
                .map(|(index, (_, mut node))| {
                    node.name = format!("{}_{}_{}", kind.prefix(), iteration, index);
                    node.time = Some(iteration.to_string());
                    node.attributes
                        .sort_by(|a, b| a.dataset_path.cmp(&b.dataset_path));
                    node
                })
                .collect();

            match kind {
                GeometryKind::Grid => harvested.grids = nodes,
                GeometryKind::Poly => harvested.polys = nodes,
            }
        }

        harvested
    }

    /// Process every input in order.
    ///
    /// A missing input aborts before anything is opened. Containers that fail
    /// to open or have a malformed data root are skipped with a warning; the
    /// run fails only if none of them contributed.
    pub fn run<C, F>(&mut self, inputs: &[PathBuf], mut open: F) -> XdmfResult<()>
    where
        C: Container,
        F: FnMut(&Path) -> XdmfResult<C>,
    {
        if let Some(missing) = inputs.iter().find(|p| !p.exists()) {
            return Err(XdmfError::MissingInput(missing.clone()));
        }

        for input in inputs {
            let result = open(input).and_then(|container| self.process(input, &container));

            match result {
                Ok(summary) => info!(
                    file = %input.display(),
                    iteration = %summary.iteration,
                    grids = summary.grid_nodes,
                    polys = summary.poly_nodes,
                    attributes = summary.attributes,
                    skipped_datasets = summary.diagnostics.len(),
                    "Harvested container"
                ),
                Err(e) if e.is_container_local() => {
                    warn!(file = %input.display(), error = %e, "Skipping container");
                    self.skipped.push(SkippedContainer {
                        source: input.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if self.iterations.is_empty() {
            return Err(XdmfError::NoUsableInput);
        }
        Ok(())
    }

    /// Assemble the output documents for `targets` from everything harvested.
    pub fn assemble(&self, targets: &OutputTargets) -> Vec<OutputDocument> {
        assemble(&self.iterations, &self.options, targets)
    }
}
