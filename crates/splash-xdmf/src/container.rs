//! Read-only view of a hierarchical container.
//!
//! The engine never touches payload values. It only needs to list the members
//! of a group and, for each dataset, its shape, element type and attributes.
//! [`Container`] captures exactly that; `splash-reader` implements it for HDF5
//! files and [`MemoryContainer`] implements it in memory.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::XdmfResult;
use crate::walker::{Classification, CLASS_ATTRIBUTE};

/// Element type of a dataset or attribute as stored in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Char,
    String,
    Enum,
    Compound,
    Opaque,
    Vlen,
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single typed attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl ScalarValue {
    pub fn native_type(&self) -> NativeType {
        match self {
            ScalarValue::I8(_) => NativeType::Int8,
            ScalarValue::I16(_) => NativeType::Int16,
            ScalarValue::I32(_) => NativeType::Int32,
            ScalarValue::I64(_) => NativeType::Int64,
            ScalarValue::U8(_) => NativeType::UInt8,
            ScalarValue::U16(_) => NativeType::UInt16,
            ScalarValue::U32(_) => NativeType::UInt32,
            ScalarValue::U64(_) => NativeType::UInt64,
            ScalarValue::F32(_) => NativeType::Float32,
            ScalarValue::F64(_) => NativeType::Float64,
        }
    }

    /// Integer view of the value, used for the classification tag.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ScalarValue::I8(v) => Some(v as i64),
            ScalarValue::I16(v) => Some(v as i64),
            ScalarValue::I32(v) => Some(v as i64),
            ScalarValue::I64(v) => Some(v),
            ScalarValue::U8(v) => Some(v as i64),
            ScalarValue::U16(v) => Some(v as i64),
            ScalarValue::U32(v) => Some(v as i64),
            ScalarValue::U64(v) => i64::try_from(v).ok(),
            ScalarValue::F32(_) | ScalarValue::F64(_) => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::I8(v) => write!(f, "{}", v),
            ScalarValue::I16(v) => write!(f, "{}", v),
            ScalarValue::I32(v) => write!(f, "{}", v),
            ScalarValue::I64(v) => write!(f, "{}", v),
            ScalarValue::U8(v) => write!(f, "{}", v),
            ScalarValue::U16(v) => write!(f, "{}", v),
            ScalarValue::U32(v) => write!(f, "{}", v),
            ScalarValue::U64(v) => write!(f, "{}", v),
            // Debug keeps the exponent for very small/large magnitudes (e.g. 1e-34)
            ScalarValue::F32(v) => write!(f, "{:?}", v),
            ScalarValue::F64(v) => write!(f, "{:?}", v),
        }
    }
}

/// Value of a dataset attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Scalar(ScalarValue),
    /// Fixed-size numeric array; all elements share one type.
    Array(Vec<ScalarValue>),
    Text(String),
    TextArray(Vec<String>),
}

impl AttrValue {
    /// Element type of the value, `None` for an empty array.
    pub fn native_type(&self) -> Option<NativeType> {
        match self {
            AttrValue::Scalar(v) => Some(v.native_type()),
            AttrValue::Array(values) => values.first().map(ScalarValue::native_type),
            AttrValue::Text(_) | AttrValue::TextArray(_) => Some(NativeType::String),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Scalar(v) => write!(f, "{}", v),
            AttrValue::Array(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::TextArray(values) => f.write_str(&values.join(" ")),
        }
    }
}

impl From<ScalarValue> for AttrValue {
    fn from(value: ScalarValue) -> Self {
        AttrValue::Scalar(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

/// One dataset inside a container.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRef {
    /// Absolute path, e.g. `/data/100/fields/Ex`
    pub path: String,
    pub shape: Vec<usize>,
    pub dtype: NativeType,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl DatasetRef {
    pub fn new(path: impl Into<String>, shape: Vec<usize>, dtype: NativeType) -> Self {
        Self {
            path: normalize_path(&path.into()),
            shape,
            dtype,
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute (builder style).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Tag the dataset the way libSplash marks grid and poly data.
    pub fn classified(self, class: Classification) -> Self {
        match class.tag() {
            Some(tag) => self.with_attribute(CLASS_ATTRIBUTE, ScalarValue::I32(tag as i32)),
            None => self,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Last path component.
    pub fn name(&self) -> &str {
        split_parent(&self.path).1
    }
}

/// A direct child of a group.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Group(String),
    Dataset(DatasetRef),
}

/// Hierarchical source of groups and datasets.
pub trait Container {
    /// Children of the group at the absolute path `group`.
    ///
    /// Returns `Ok(None)` if there is no such group.
    fn members(&self, group: &str) -> XdmfResult<Option<Vec<Entry>>>;
}

impl<C: Container + ?Sized> Container for &C {
    fn members(&self, group: &str) -> XdmfResult<Option<Vec<Entry>>> {
        (**self).members(group)
    }
}

impl<C: Container + ?Sized> Container for Box<C> {
    fn members(&self, group: &str) -> XdmfResult<Option<Vec<Entry>>> {
        (**self).members(group)
    }
}

/// In-memory container, mainly for tests and fixtures.
///
/// Groups are created implicitly for every ancestor of an added dataset.
#[derive(Debug, Clone)]
pub struct MemoryContainer {
    groups: BTreeSet<String>,
    datasets: Vec<DatasetRef>,
}

impl Default for MemoryContainer {
    fn default() -> Self {
        let mut groups = BTreeSet::new();
        groups.insert("/".to_string());
        Self {
            groups,
            datasets: Vec::new(),
        }
    }
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an (empty) group and its ancestors.
    pub fn with_group(mut self, path: &str) -> Self {
        self.add_group(path);
        self
    }

    pub fn with_dataset(mut self, dataset: DatasetRef) -> Self {
        self.add_dataset(dataset);
        self
    }

    pub fn add_group(&mut self, path: &str) {
        let mut current = normalize_path(path);
        while self.groups.insert(current.clone()) {
            current = split_parent(&current).0.to_string();
        }
    }

    pub fn add_dataset(&mut self, dataset: DatasetRef) {
        let parent = split_parent(&dataset.path).0.to_string();
        self.add_group(&parent);
        self.datasets.retain(|d| d.path != dataset.path);
        self.datasets.push(dataset);
    }

    pub fn datasets(&self) -> &[DatasetRef] {
        &self.datasets
    }
}

impl Container for MemoryContainer {
    fn members(&self, group: &str) -> XdmfResult<Option<Vec<Entry>>> {
        let group = normalize_path(group);
        if !self.groups.contains(&group) {
            return Ok(None);
        }

        let mut entries: Vec<Entry> = self
            .groups
            .iter()
            .filter(|g| g.as_str() != "/" && split_parent(g).0 == group)
            .map(|g| Entry::Group(split_parent(g).1.to_string()))
            .collect();

        entries.extend(
            self.datasets
                .iter()
                .filter(|d| split_parent(&d.path).0 == group)
                .cloned()
                .map(Entry::Dataset),
        );

        Ok(Some(entries))
    }
}

/// Join a group path and a member name.
pub fn join_path(group: &str, name: &str) -> String {
    if group.ends_with('/') {
        format!("{}{}", group, name)
    } else {
        format!("{}/{}", group, name)
    }
}

/// Ensure a leading `/` and no trailing `/` (except for the root itself).
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{}", trimmed)
}

/// Split `/a/b/c` into (`/a/b`, `c`); the root's parent is the root.
fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) => ("/", &path[1..]),
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => ("/", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_container_lists_members() {
        let container = MemoryContainer::new()
            .with_dataset(DatasetRef::new("/data/5/fields/e", vec![4, 4], NativeType::Float32))
            .with_dataset(DatasetRef::new("/data/5/count", vec![10], NativeType::UInt64));

        let data = container.members("/data").unwrap().unwrap();
        assert_eq!(data, vec![Entry::Group("5".to_string())]);

        let iteration = container.members("/data/5").unwrap().unwrap();
        assert_eq!(iteration.len(), 2);
        assert!(iteration.contains(&Entry::Group("fields".to_string())));
        assert!(iteration
            .iter()
            .any(|e| matches!(e, Entry::Dataset(d) if d.name() == "count")));

        assert!(container.members("/missing").unwrap().is_none());
    }

    #[test]
    fn test_classified_round_trips_through_classification() {
        let base = DatasetRef::new("/data/0/e", vec![2, 2], NativeType::Float32);
        for class in [Classification::Grid, Classification::Poly] {
            assert_eq!(Classification::of(&base.clone().classified(class)), class);
        }

        let plain = base.clone().classified(Classification::Unclassified);
        assert!(plain.attribute(CLASS_ATTRIBUTE).is_none());
        assert_eq!(plain, base);
    }

    #[test]
    fn test_memory_container_empty_group() {
        let container = MemoryContainer::new().with_group("data");
        assert_eq!(container.members("/data").unwrap(), Some(vec![]));
        assert_eq!(
            container.members("/").unwrap(),
            Some(vec![Entry::Group("data".to_string())])
        );
    }

    #[test]
    fn test_attr_value_formatting() {
        assert_eq!(AttrValue::Scalar(ScalarValue::I32(-3)).to_string(), "-3");
        assert_eq!(AttrValue::Scalar(ScalarValue::F64(1.5)).to_string(), "1.5");
        assert_eq!(AttrValue::Scalar(ScalarValue::F64(1e-34)).to_string(), "1e-34");
        let arr = AttrValue::Array(vec![
            ScalarValue::U32(1),
            ScalarValue::U32(2),
            ScalarValue::U32(3),
        ]);
        assert_eq!(arr.to_string(), "1 2 3");
        assert_eq!(arr.native_type(), Some(NativeType::UInt32));
        assert_eq!(AttrValue::Array(vec![]).native_type(), None);
        assert_eq!(AttrValue::from("m/s").native_type(), Some(NativeType::String));
    }

    #[test]
    fn test_scalar_as_i64() {
        assert_eq!(ScalarValue::U8(20).as_i64(), Some(20));
        assert_eq!(ScalarValue::U64(u64::MAX).as_i64(), None);
        assert_eq!(ScalarValue::F32(20.0).as_i64(), None);
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", "data"), "/data");
        assert_eq!(join_path("/data", "5"), "/data/5");
    }
}
