//! Grid and poly builders.
//!
//! Both builders share one contract: compute the dataset's dimension
//! signature, find or create the geometry node for it, and attach an
//! [`AttributeRef`] describing the dataset. They differ only in how the
//! signature, topology and geometry are derived, which is dispatched on
//! [`GeometryKind`].

use tracing::debug;

use crate::cache::{DimensionSignature, GeometryCache};
use crate::container::DatasetRef;
use crate::error::Diagnostic;
use crate::model::{AttributeRef, Geometry, GeometryKind, GeometryNode, Information, Topology};
use crate::paths::display_name;
use crate::type_map::map_native_type;

/// Attributes whose name starts with this marker are libSplash bookkeeping.
pub const RESERVED_MARKER: char = '_';

impl GeometryKind {
    /// Dimension signature of `dataset` for this kind.
    pub fn signature(&self, dataset: &DatasetRef) -> Result<DimensionSignature, Diagnostic> {
        match self {
            // 1-D fields become a single-row 2-D mesh; XDMF has no 1-D CoRectMesh
            GeometryKind::Grid => match dataset.shape.as_slice() {
                [extent] => Ok(DimensionSignature::new(vec![1, *extent])),
                [_, _] | [_, _, _] => Ok(DimensionSignature::new(dataset.shape.clone())),
                _ => Err(Diagnostic::UnsupportedRank {
                    dataset: dataset.path.clone(),
                    rank: dataset.shape.len(),
                }),
            },
            GeometryKind::Poly => {
                let count = dataset.shape.iter().product();
                Ok(DimensionSignature::new(vec![count]))
            }
        }
    }

    /// Fresh node for a signature of this kind.
    pub fn create_node(&self, signature: &DimensionSignature) -> GeometryNode {
        match self {
            GeometryKind::Grid => GeometryNode::new(
                GeometryKind::Grid,
                Topology::CoRectMesh {
                    dims: signature.extents().to_vec(),
                },
                Some(Geometry::unit(signature.rank())),
            ),
            GeometryKind::Poly => GeometryNode::new(
                GeometryKind::Poly,
                Topology::Polyvertex {
                    count: signature.extents().iter().product(),
                },
                None,
            ),
        }
    }
}

/// Attach `dataset` to the node for its signature in `cache`.
///
/// `filename` is the container name written into the cross-reference. On a
/// diagnostic nothing is added to the cache.
pub fn add_dataset(
    kind: GeometryKind,
    cache: &mut GeometryCache,
    dataset: &DatasetRef,
    filename: &str,
) -> Result<(), Diagnostic> {
    let signature = kind.signature(dataset)?;

    let number_type = map_native_type(&dataset.dtype).ok_or_else(|| Diagnostic::UnsupportedType {
        dataset: dataset.path.clone(),
        dtype: dataset.dtype.to_string(),
    })?;

    let attribute = AttributeRef {
        name: display_name(&dataset.path).to_string(),
        filename: filename.to_string(),
        dataset_path: dataset.path.clone(),
        dims: dataset.shape.clone(),
        number_type,
        information: information_entries(dataset),
    };

    debug!(
        dataset = %dataset.path,
        kind = %kind,
        signature = %signature,
        "Creating XDMF entry"
    );

    let node = cache.get_or_insert_with(signature, |sig| kind.create_node(sig));
    node.attributes.push(attribute);
    Ok(())
}

/// Scalar metadata of a dataset that can be shown as `Information`.
///
/// Reserved attributes and values without a number type (strings, 8/16-bit
/// integers, empty arrays) are left out.
pub fn information_entries(dataset: &DatasetRef) -> Vec<Information> {
    dataset
        .attributes
        .iter()
        .filter(|(name, _)| !name.starts_with(RESERVED_MARKER))
        .filter(|(_, value)| {
            value
                .native_type()
                .and_then(|t| map_native_type(&t))
                .is_some()
        })
        .map(|(name, value)| Information {
            name: name.clone(),
            value: value.to_string(),
        })
        .collect()
}
