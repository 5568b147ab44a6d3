//! In-memory XDMF description built by the engine.

use std::fmt;

use crate::type_map::NumberType;

/// Geometry kind a classified dataset is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    /// Regular mesh (co-rectilinear, unit spacing)
    Grid,
    /// Point set (poly-vertex)
    Poly,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 2] = [GeometryKind::Grid, GeometryKind::Poly];

    /// Prefix used in generated node names.
    pub fn prefix(&self) -> &'static str {
        match self {
            GeometryKind::Grid => "Grid",
            GeometryKind::Poly => "Poly",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GeometryKind::Grid => "GRID",
            GeometryKind::Poly => "POLY",
        })
    }
}

/// Topology of a geometry node.
#[derive(Debug, Clone, PartialEq)]
pub enum Topology {
    /// Regular mesh with the given number of points per axis.
    CoRectMesh { dims: Vec<usize> },
    /// Unconnected points.
    Polyvertex { count: usize },
}

impl Topology {
    /// XDMF `TopologyType` value.
    pub fn topology_type(&self) -> String {
        match self {
            Topology::CoRectMesh { dims } => format!("{}DCoRectMesh", dims.len()),
            Topology::Polyvertex { .. } => "Polyvertex".to_string(),
        }
    }
}

/// Origin/spacing coordinate description of a regular mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub origin: Vec<f64>,
    pub spacing: Vec<f64>,
}

impl Geometry {
    /// Normalized coordinates: origin 0 and spacing 1 on every axis.
    pub fn unit(rank: usize) -> Self {
        Self {
            origin: vec![0.0; rank],
            spacing: vec![1.0; rank],
        }
    }

    pub fn rank(&self) -> usize {
        self.origin.len()
    }

    /// XDMF `GeometryType` value.
    pub fn geometry_type(&self) -> &'static str {
        if self.rank() == 2 {
            "ORIGIN_DXDY"
        } else {
            "ORIGIN_DXDYDZ"
        }
    }
}

/// Scalar metadata entry attached to an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Information {
    pub name: String,
    pub value: String,
}

/// Cross-reference to one dataset's payload.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRef {
    /// Dataset path without the `data/<iteration>/` prefix
    pub name: String,
    /// Container filename used in the cross-reference
    pub filename: String,
    /// Absolute dataset path inside the container
    pub dataset_path: String,
    pub dims: Vec<usize>,
    pub number_type: NumberType,
    pub information: Vec<Information>,
}

impl AttributeRef {
    /// `<filename>:<dataset-path>` text of the HDF data item.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.filename, self.dataset_path)
    }
}

/// One distinct geometry and the datasets defined on it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryNode {
    pub kind: GeometryKind,
    /// Assigned when the node is harvested, e.g. `Grid_100_0`
    pub name: String,
    /// Iteration the node belongs to
    pub time: Option<String>,
    pub topology: Topology,
    pub geometry: Option<Geometry>,
    pub attributes: Vec<AttributeRef>,
}

impl GeometryNode {
    pub fn new(kind: GeometryKind, topology: Topology, geometry: Option<Geometry>) -> Self {
        Self {
            kind,
            name: String::new(),
            time: None,
            topology,
            geometry,
            attributes: Vec::new(),
        }
    }
}

/// Nodes of one kind contributed by a single iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationEntry {
    pub name: String,
    pub iteration: String,
    pub nodes: Vec<GeometryNode>,
}

/// Top-level grouping below the domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Spatial {
        name: String,
        nodes: Vec<GeometryNode>,
    },
    Temporal {
        name: String,
        entries: Vec<IterationEntry>,
    },
}

impl Collection {
    pub fn name(&self) -> &str {
        match self {
            Collection::Spatial { name, .. } | Collection::Temporal { name, .. } => name,
        }
    }

    /// Every geometry node in the collection, in document order.
    pub fn nodes(&self) -> Vec<&GeometryNode> {
        match self {
            Collection::Spatial { nodes, .. } => nodes.iter().collect(),
            Collection::Temporal { entries, .. } => {
                entries.iter().flat_map(|e| e.nodes.iter()).collect()
            }
        }
    }
}

/// A complete XDMF document (a single domain).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XdmfDocument {
    pub collections: Vec<Collection>,
}

impl XdmfDocument {
    pub fn nodes(&self) -> Vec<&GeometryNode> {
        self.collections.iter().flat_map(|c| c.nodes()).collect()
    }

    pub fn nodes_of_kind(&self, kind: GeometryKind) -> Vec<&GeometryNode> {
        self.nodes().into_iter().filter(|n| n.kind == kind).collect()
    }
}
