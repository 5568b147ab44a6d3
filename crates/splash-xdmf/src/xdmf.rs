//! XDMF serializer.
//!
//! Writes an [`XdmfDocument`] as an XDMF 2 XML file with `quick-xml`.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::cache::join_extents;
use crate::error::XdmfResult;
use crate::model::{AttributeRef, Collection, Geometry, GeometryNode, Topology, XdmfDocument};

pub const XDMF_VERSION: &str = "2.0";

const DOCTYPE: &str = r#"Xdmf SYSTEM "Xdmf.dtd" []"#;

type Attrs<'a> = [(&'a str, String)];

struct XdmfWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XdmfWriter<W> {
    fn new(out: W) -> Self {
        Self {
            writer: Writer::new_with_indent(out, b' ', 2),
        }
    }

    fn element(name: &str, attrs: &Attrs<'_>) -> BytesStart<'static> {
        BytesStart::new(name.to_string())
            .with_attributes(attrs.iter().map(|(k, v)| (*k, v.as_str())))
    }

    fn start(&mut self, name: &str, attrs: &Attrs<'_>) -> XdmfResult<()> {
        self.writer.write_event(Event::Start(Self::element(name, attrs)))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attrs: &Attrs<'_>) -> XdmfResult<()> {
        self.writer.write_event(Event::Empty(Self::element(name, attrs)))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> XdmfResult<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn text_element(&mut self, name: &str, attrs: &Attrs<'_>, text: &str) -> XdmfResult<()> {
        self.start(name, attrs)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn document(&mut self, document: &XdmfDocument) -> XdmfResult<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.writer
            .write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;

        self.start("Xdmf", &[("Version", XDMF_VERSION.to_string())])?;
        self.start("Domain", &[])?;
        for collection in &document.collections {
            self.collection(collection)?;
        }
        self.end("Domain")?;
        self.end("Xdmf")?;
        self.writer.get_mut().write_all(b"\n")?;
        Ok(())
    }

    fn collection(&mut self, collection: &Collection) -> XdmfResult<()> {
        match collection {
            Collection::Spatial { name, nodes } => {
                self.start("Grid", &collection_attrs(name, "Spatial"))?;
                for node in nodes {
                    self.node(node)?;
                }
            }
            Collection::Temporal { name, entries } => {
                self.start("Grid", &collection_attrs(name, "Temporal"))?;
                for entry in entries {
                    self.start("Grid", &collection_attrs(&entry.name, "Spatial"))?;
                    self.empty("Time", &[("Value", entry.iteration.clone())])?;
                    for node in &entry.nodes {
                        self.node(node)?;
                    }
                    self.end("Grid")?;
                }
            }
        }
        self.end("Grid")
    }

    fn node(&mut self, node: &GeometryNode) -> XdmfResult<()> {
        self.start(
            "Grid",
            &[
                ("Name", node.name.clone()),
                ("GridType", "Uniform".to_string()),
            ],
        )?;
        if let Some(time) = &node.time {
            self.empty("Time", &[("Value", time.clone())])?;
        }
        self.topology(&node.topology)?;
        if let Some(geometry) = &node.geometry {
            self.geometry(geometry)?;
        }
        for attribute in &node.attributes {
            self.attribute(attribute)?;
        }
        self.end("Grid")
    }

    fn topology(&mut self, topology: &Topology) -> XdmfResult<()> {
        let size = match topology {
            Topology::CoRectMesh { dims } => ("Dimensions", join_extents(dims)),
            Topology::Polyvertex { count } => ("NumberOfElements", count.to_string()),
        };
        self.empty(
            "Topology",
            &[("TopologyType", topology.topology_type()), size],
        )
    }

    fn geometry(&mut self, geometry: &Geometry) -> XdmfResult<()> {
        self.start(
            "Geometry",
            &[("GeometryType", geometry.geometry_type().to_string())],
        )?;
        for (name, values) in [("Origin", &geometry.origin), ("Spacing", &geometry.spacing)] {
            self.text_element(
                "DataItem",
                &[
                    ("Name", name.to_string()),
                    ("Dimensions", values.len().to_string()),
                    ("NumberType", "Float".to_string()),
                    ("Precision", "8".to_string()),
                    ("Format", "XML".to_string()),
                ],
                &join_values(values),
            )?;
        }
        self.end("Geometry")
    }

    fn attribute(&mut self, attribute: &AttributeRef) -> XdmfResult<()> {
        self.start(
            "Attribute",
            &[
                ("Name", attribute.name.clone()),
                ("AttributeType", "Scalar".to_string()),
                ("Center", "Node".to_string()),
            ],
        )?;
        for info in &attribute.information {
            self.empty(
                "Information",
                &[("Name", info.name.clone()), ("Value", info.value.clone())],
            )?;
        }
        self.text_element(
            "DataItem",
            &[
                ("Dimensions", join_extents(&attribute.dims)),
                ("NumberType", attribute.number_type.kind.to_string()),
                ("Precision", attribute.number_type.precision.to_string()),
                ("Format", "HDF".to_string()),
            ],
            &attribute.reference(),
        )?;
        self.end("Attribute")
    }
}

fn collection_attrs(name: &str, collection_type: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Name", name.to_string()),
        ("GridType", "Collection".to_string()),
        ("CollectionType", collection_type.to_string()),
    ]
}

fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serialize `document` into `out`, returning the writer.
pub fn write_document<W: Write>(document: &XdmfDocument, out: W) -> XdmfResult<W> {
    let mut writer = XdmfWriter::new(out);
    writer.document(document)?;
    Ok(writer.writer.into_inner())
}

/// Serialize `document` to a string.
pub fn to_xml_string(document: &XdmfDocument) -> XdmfResult<String> {
    let bytes = write_document(document, Vec::new())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeometryKind, Information, IterationEntry};
    use crate::type_map::{NumberKind, NumberType};

    fn grid_node() -> GeometryNode {
        let mut node = GeometryNode::new(
            GeometryKind::Grid,
            Topology::CoRectMesh { dims: vec![4, 4, 4] },
            Some(Geometry::unit(3)),
        );
        node.name = "Grid_100_0".to_string();
        node.time = Some("100".to_string());
        node.attributes.push(AttributeRef {
            name: "fields/E<x>".to_string(),
            filename: "sim_100.h5".to_string(),
            dataset_path: "/data/100/fields/E<x>".to_string(),
            dims: vec![4, 4, 4],
            number_type: NumberType::new(NumberKind::Float, 4),
            information: vec![Information {
                name: "unitSI".to_string(),
                value: "2.5".to_string(),
            }],
        });
        node
    }

    fn poly_node() -> GeometryNode {
        let mut node = GeometryNode::new(
            GeometryKind::Poly,
            Topology::Polyvertex { count: 100 },
            None,
        );
        node.name = "Poly_100_0".to_string();
        node
    }

    #[test]
    fn test_spatial_document() {
        let document = XdmfDocument {
            collections: vec![Collection::Spatial {
                name: "Grids".to_string(),
                nodes: vec![grid_node()],
            }],
        };
        let xml = to_xml_string(&document).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<!DOCTYPE Xdmf SYSTEM \"Xdmf.dtd\" []>"));
        assert!(xml.contains("<Xdmf Version=\"2.0\">"));
        assert!(xml.contains(
            "<Grid Name=\"Grids\" GridType=\"Collection\" CollectionType=\"Spatial\">"
        ));
        assert!(xml.contains("<Grid Name=\"Grid_100_0\" GridType=\"Uniform\">"));
        assert!(xml.contains("<Time Value=\"100\"/>"));
        assert!(xml.contains("<Topology TopologyType=\"3DCoRectMesh\" Dimensions=\"4 4 4\"/>"));
        assert!(xml.contains("<Geometry GeometryType=\"ORIGIN_DXDYDZ\">"));
        assert!(xml.contains(">0 0 0</DataItem>"));
        assert!(xml.contains(">1 1 1</DataItem>"));
        assert!(xml.contains("<Information Name=\"unitSI\" Value=\"2.5\"/>"));
        assert!(xml.contains(
            "<DataItem Dimensions=\"4 4 4\" NumberType=\"Float\" Precision=\"4\" Format=\"HDF\">sim_100.h5:/data/100/fields/E&lt;x&gt;</DataItem>"
        ));
        assert!(xml.contains("Name=\"fields/E&lt;x&gt;\""));
        assert!(xml.ends_with("</Xdmf>\n"));
    }

    #[test]
    fn test_temporal_document() {
        let document = XdmfDocument {
            collections: vec![Collection::Temporal {
                name: "PolyTime".to_string(),
                entries: vec![IterationEntry {
                    name: "Poly_100".to_string(),
                    iteration: "100".to_string(),
                    nodes: vec![poly_node()],
                }],
            }],
        };
        let xml = to_xml_string(&document).unwrap();

        assert!(xml.contains(
            "<Grid Name=\"PolyTime\" GridType=\"Collection\" CollectionType=\"Temporal\">"
        ));
        assert!(xml.contains(
            "<Grid Name=\"Poly_100\" GridType=\"Collection\" CollectionType=\"Spatial\">"
        ));
        assert!(xml.contains("<Topology TopologyType=\"Polyvertex\" NumberOfElements=\"100\"/>"));
        assert!(!xml.contains("<Geometry"));
    }

    #[test]
    fn test_empty_document() {
        let xml = to_xml_string(&XdmfDocument::default()).unwrap();
        assert!(xml.contains("<Domain>"));
        assert!(xml.contains("</Domain>"));
        assert!(!xml.contains("<Grid"));
    }
}
