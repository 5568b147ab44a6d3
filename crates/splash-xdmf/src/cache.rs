//! Per-pass geometry node cache.
//!
//! During one container's parse pass every distinct dimension signature owns
//! exactly one geometry node per kind. The cache is keyed by an ordered map so
//! that harvesting yields nodes in signature order, independent of the order
//! in which the container enumerated its members.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{GeometryKind, GeometryNode};

/// Shape identity of a geometry: full extents for grids, point count for polys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionSignature(Vec<usize>);

impl DimensionSignature {
    pub fn new(extents: Vec<usize>) -> Self {
        Self(extents)
    }

    pub fn extents(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for DimensionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_extents(&self.0))
    }
}

/// Render extents the way XDMF `Dimensions` attributes expect them.
pub fn join_extents(extents: &[usize]) -> String {
    extents
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Signature -> node map for one geometry kind.
#[derive(Debug, Default)]
pub struct GeometryCache {
    nodes: BTreeMap<DimensionSignature, GeometryNode>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the node for `signature`, creating it with `create` on first use.
    pub fn get_or_insert_with<F>(&mut self, signature: DimensionSignature, create: F) -> &mut GeometryNode
    where
        F: FnOnce(&DimensionSignature) -> GeometryNode,
    {
        self.nodes.entry(signature).or_insert_with_key(|sig| create(sig))
    }

    pub fn get(&self, signature: &DimensionSignature) -> Option<&GeometryNode> {
        self.nodes.get(signature)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Move all nodes out in signature order, leaving the cache empty.
    pub fn drain(&mut self) -> impl Iterator<Item = (DimensionSignature, GeometryNode)> {
        std::mem::take(&mut self.nodes).into_iter()
    }
}

/// The grid and poly caches owned by a conversion session.
#[derive(Debug, Default)]
pub struct GeometryCaches {
    pub grids: GeometryCache,
    pub polys: GeometryCache,
}

impl GeometryCaches {
    pub fn for_kind_mut(&mut self, kind: GeometryKind) -> &mut GeometryCache {
        match kind {
            GeometryKind::Grid => &mut self.grids,
            GeometryKind::Poly => &mut self.polys,
        }
    }

    pub fn clear(&mut self) {
        self.grids.clear();
        self.polys.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty() && self.polys.is_empty()
    }
}
