//! Minimal XML tree for asserting on serialized XDMF output.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One parsed element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(e: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut node = XmlNode {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            ..Default::default()
        };
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            node.attributes.insert(key, value);
        }
        Ok(node)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Direct children named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Every descendant named `name`, depth first.
    pub fn find_all(&self, name: &str) -> Vec<&XmlNode> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlNode>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect(name, found);
        }
    }

    /// `Grid` descendants with `GridType="Uniform"`.
    pub fn uniform_grids(&self) -> Vec<&XmlNode> {
        self.find_all("Grid")
            .into_iter()
            .filter(|g| g.attr("GridType") == Some("Uniform"))
            .collect()
    }
}

/// Parse `xml` and return its root element.
pub fn parse_xml(xml: &str) -> Result<XmlNode, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<XmlNode> = vec![XmlNode::default()];
    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(XmlNode::from_start(&e)?),
            Event::Empty(e) => {
                let node = XmlNode::from_start(&e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape()?);
                }
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(node) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let document = stack.swap_remove(0);
    Ok(document.children.into_iter().next().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let xml = r#"<?xml version="1.0"?>
<Xdmf Version="2.0">
  <Domain>
    <Grid Name="a" GridType="Uniform"><Time Value="1"/></Grid>
    <Grid Name="b" GridType="Collection">
      <Grid Name="c" GridType="Uniform">
        <DataItem Format="HDF">f.h5:/data/1/x&amp;y</DataItem>
      </Grid>
    </Grid>
  </Domain>
</Xdmf>"#;
        let root = parse_xml(xml).unwrap();
        assert_eq!(root.name, "Xdmf");
        assert_eq!(root.attr("Version"), Some("2.0"));

        let grids = root.find_all("Grid");
        assert_eq!(grids.len(), 3);
        assert_eq!(root.uniform_grids().len(), 2);

        let item = &root.find_all("DataItem")[0];
        assert_eq!(item.text, "f.h5:/data/1/x&y");
        assert_eq!(grids[0].child("Time").and_then(|t| t.attr("Value")), Some("1"));
    }
}
