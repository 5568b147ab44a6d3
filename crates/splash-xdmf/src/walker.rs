//! Recursive tree walk and dataset classification.

use tracing::{debug, warn};

use crate::builder::add_dataset;
use crate::cache::GeometryCaches;
use crate::container::{join_path, AttrValue, Container, DatasetRef, Entry};
use crate::error::{Diagnostic, XdmfResult};
use crate::model::GeometryKind;

/// Reserved dataset attribute holding the classification tag.
pub const CLASS_ATTRIBUTE: &str = "_class";

/// Tag written by libSplash for point-set (poly) data.
pub const POLY_TAG: i64 = 10;

/// Tag written by libSplash for regular grid data.
pub const GRID_TAG: i64 = 20;

/// Geometry classification of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Grid,
    Poly,
    Unclassified,
}

impl Classification {
    /// Classify a dataset by its `_class` attribute.
    pub fn of(dataset: &DatasetRef) -> Self {
        let tag = match dataset.attribute(CLASS_ATTRIBUTE) {
            Some(AttrValue::Scalar(value)) => value.as_i64(),
            Some(AttrValue::Array(values)) if values.len() == 1 => values[0].as_i64(),
            _ => None,
        };
        match tag {
            Some(GRID_TAG) => Classification::Grid,
            Some(POLY_TAG) => Classification::Poly,
            _ => Classification::Unclassified,
        }
    }

    /// Tag value written for this classification.
    pub fn tag(&self) -> Option<i64> {
        match self {
            Classification::Grid => Some(GRID_TAG),
            Classification::Poly => Some(POLY_TAG),
            Classification::Unclassified => None,
        }
    }

    pub fn geometry_kind(&self) -> Option<GeometryKind> {
        match self {
            Classification::Grid => Some(GeometryKind::Grid),
            Classification::Poly => Some(GeometryKind::Poly),
            Classification::Unclassified => None,
        }
    }
}

/// Counters collected during one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub groups: usize,
    pub datasets: usize,
    pub classified: usize,
}

/// Visits every group and dataset below a starting group.
pub struct TreeWalker<'a, C: Container + ?Sized> {
    container: &'a C,
    filename: &'a str,
    caches: &'a mut GeometryCaches,
    diagnostics: Vec<Diagnostic>,
    stats: WalkStats,
}

impl<'a, C: Container + ?Sized> TreeWalker<'a, C> {
    pub fn new(container: &'a C, filename: &'a str, caches: &'a mut GeometryCaches) -> Self {
        Self {
            container,
            filename,
            caches,
            diagnostics: Vec::new(),
            stats: WalkStats::default(),
        }
    }

    /// Walk the group at `group`; `depth` only affects log indentation.
    pub fn walk(&mut self, group: &str, depth: usize) -> XdmfResult<()> {
        let Some(entries) = self.container.members(group)? else {
            return Ok(());
        };
        self.stats.groups += 1;

        for entry in entries {
            match entry {
                Entry::Group(name) => {
                    debug!("{}{} (G)", "-".repeat(depth), name);
                    self.walk(&join_path(group, &name), depth + 1)?;
                }
                Entry::Dataset(dataset) => self.visit_dataset(&dataset, depth),
            }
        }
        Ok(())
    }

    fn visit_dataset(&mut self, dataset: &DatasetRef, depth: usize) {
        self.stats.datasets += 1;
        let class = Classification::of(dataset);
        debug!("{}{} (D): {:?}", "-".repeat(depth), dataset.name(), class);

        let Some(kind) = class.geometry_kind() else {
            return;
        };
        self.stats.classified += 1;

        let cache = self.caches.for_kind_mut(kind);
        if let Err(diagnostic) = add_dataset(kind, cache, dataset, self.filename) {
            warn!(file = self.filename, "Skipping dataset: {}", diagnostic);
            self.diagnostics.push(diagnostic);
        }
    }

    /// Finish the walk, returning the diagnostics and counters.
    pub fn finish(self) -> (Vec<Diagnostic>, WalkStats) {
        (self.diagnostics, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DimensionSignature;
    use crate::container::{MemoryContainer, NativeType, ScalarValue};

    #[test]
    fn test_classification_tags() {
        let base = DatasetRef::new("/data/1/x", vec![2, 2], NativeType::Float32);
        assert_eq!(Classification::of(&base), Classification::Unclassified);

        let grid = base.clone().classified(Classification::Grid);
        assert_eq!(Classification::of(&grid), Classification::Grid);

        let poly = base.clone().classified(Classification::Poly);
        assert_eq!(Classification::of(&poly), Classification::Poly);

        let other = base.clone().with_attribute(CLASS_ATTRIBUTE, ScalarValue::I32(0));
        assert_eq!(Classification::of(&other), Classification::Unclassified);

        let unsigned = base.clone().with_attribute(CLASS_ATTRIBUTE, ScalarValue::U8(20));
        assert_eq!(Classification::of(&unsigned), Classification::Grid);

        let text = base.with_attribute(CLASS_ATTRIBUTE, "20");
        assert_eq!(Classification::of(&text), Classification::Unclassified);
    }

    #[test]
    fn test_walk_routes_by_classification() {
        let container = MemoryContainer::new()
            .with_dataset(
                DatasetRef::new("/data/3/fields/deep/E", vec![8, 8, 8], NativeType::Float32)
                    .classified(Classification::Grid),
            )
            .with_dataset(
                DatasetRef::new("/data/3/particles/x", vec![50], NativeType::Float64)
                    .classified(Classification::Poly),
            )
            .with_dataset(DatasetRef::new("/data/3/raw", vec![8, 8, 8], NativeType::Float32))
            .with_dataset(
                DatasetRef::new("/data/3/fields/mask", vec![8, 8, 8], NativeType::Int8)
                    .classified(Classification::Grid),
            );

        let mut caches = GeometryCaches::default();
        let mut walker = TreeWalker::new(&container, "run_3.h5", &mut caches);
        walker.walk("/data/3", 1).unwrap();
        let (diagnostics, stats) = walker.finish();

        assert_eq!(stats.datasets, 4);
        assert_eq!(stats.classified, 3);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].dataset(), "/data/3/fields/mask");

        let grid = caches
            .grids
            .get(&DimensionSignature::new(vec![8, 8, 8]))
            .unwrap();
        assert_eq!(grid.attributes.len(), 1);
        assert_eq!(grid.attributes[0].name, "fields/deep/E");
        assert_eq!(caches.polys.len(), 1);
    }

    #[test]
    fn test_walk_missing_group_is_empty() {
        let container = MemoryContainer::new();
        let mut caches = GeometryCaches::default();
        let mut walker = TreeWalker::new(&container, "f.h5", &mut caches);
        walker.walk("/nope", 0).unwrap();
        let (_, stats) = walker.finish();
        assert_eq!(stats, WalkStats::default());
    }
}
