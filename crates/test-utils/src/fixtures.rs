//! Common container fixtures for splash2xdmf tests.
//!
//! Each fixture mirrors the layout libSplash writes: one iteration group
//! below `/data`, datasets tagged with a `_class` attribute.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use splash_xdmf::{
    AttrValue, Classification, DatasetRef, MemoryContainer, NativeType, ScalarValue, XdmfError,
    XdmfResult,
};

/// Shapes used by the field fixtures.
pub mod shapes {
    pub const CUBE: [usize; 3] = [4, 4, 4];
    pub const PLANE: [usize; 2] = [2, 2];
    pub const PARTICLES: usize = 100;
}

fn dataset(iteration: u64, path: &str, shape: &[usize], dtype: NativeType) -> DatasetRef {
    DatasetRef::new(format!("/data/{}/{}", iteration, path), shape.to_vec(), dtype)
}

/// Grid-classified field dataset below `/data/<iteration>/`.
pub fn grid_field(iteration: u64, path: &str, shape: &[usize], dtype: NativeType) -> DatasetRef {
    dataset(iteration, path, shape, dtype)
        .classified(Classification::Grid)
        .with_attribute("unitSI", ScalarValue::F64(1.0))
}

/// Poly-classified particle dataset below `/data/<iteration>/`.
pub fn poly_record(iteration: u64, path: &str, count: usize, dtype: NativeType) -> DatasetRef {
    dataset(iteration, path, &[count], dtype).classified(Classification::Poly)
}

/// Iteration 5 with two 4x4x4 fields and one 2x2 field, no particles.
pub fn single_iteration_fields() -> MemoryContainer {
    MemoryContainer::new()
        .with_dataset(grid_field(5, "fields/Ex", &shapes::CUBE, NativeType::Float32))
        .with_dataset(grid_field(5, "fields/Ey", &shapes::CUBE, NativeType::Float32))
        .with_dataset(grid_field(5, "fields/rho", &shapes::PLANE, NativeType::Float64))
}

/// One member of a time series: fields and an electron species.
pub fn series_member(iteration: u64) -> MemoryContainer {
    MemoryContainer::new()
        .with_dataset(grid_field(iteration, "fields/Bx", &shapes::CUBE, NativeType::Float32))
        .with_dataset(grid_field(iteration, "fields/By", &shapes::CUBE, NativeType::Float32))
        .with_dataset(poly_record(
            iteration,
            "particles/e/position/x",
            shapes::PARTICLES,
            NativeType::Float32,
        ))
        .with_dataset(poly_record(
            iteration,
            "particles/e/weighting",
            shapes::PARTICLES,
            NativeType::Float32,
        ))
        .with_dataset(
            poly_record(iteration, "particles/e/id", shapes::PARTICLES, NativeType::UInt64)
                .with_attribute("unitDimension", AttrValue::Array(vec![ScalarValue::F64(0.0); 7])),
        )
}

/// Iteration 3 where one grid dataset has a 16-bit element type.
pub fn unmappable_type() -> MemoryContainer {
    MemoryContainer::new()
        .with_dataset(grid_field(3, "fields/Ex", &shapes::CUBE, NativeType::Float32))
        .with_dataset(grid_field(3, "fields/mask", &shapes::CUBE, NativeType::Int16))
        .with_dataset(grid_field(3, "fields/Ez", &shapes::CUBE, NativeType::Float64))
}

/// Iteration 6 with a 64-cell line profile next to an 8x8 slice.
pub fn line_and_slice() -> MemoryContainer {
    MemoryContainer::new()
        .with_dataset(grid_field(6, "fields/profile", &[64], NativeType::Float32))
        .with_dataset(grid_field(6, "fields/slice", &[8, 8], NativeType::Float32))
}

/// Container with two iteration groups below `/data`.
pub fn two_iterations() -> MemoryContainer {
    MemoryContainer::new()
        .with_dataset(grid_field(1, "fields/Ex", &shapes::CUBE, NativeType::Float32))
        .with_dataset(grid_field(2, "fields/Ex", &shapes::CUBE, NativeType::Float32))
}

/// Container without a `/data` group.
pub fn missing_data_root() -> MemoryContainer {
    MemoryContainer::new().with_dataset(DatasetRef::new(
        "/meta/header",
        vec![1],
        NativeType::Int32,
    ))
}

/// Create empty files named `names` in `dir`, so that existence checks pass.
pub fn touch_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            std::fs::write(&path, b"").expect("Failed to create fixture file");
            path
        })
        .collect()
}

/// Opener that resolves a path to the fixture registered under its file name.
///
/// Unknown names fail like an unreadable container.
pub fn fixture_opener(
    fixtures: Vec<(&str, MemoryContainer)>,
) -> impl FnMut(&Path) -> XdmfResult<MemoryContainer> {
    let fixtures: BTreeMap<String, MemoryContainer> = fixtures
        .into_iter()
        .map(|(name, container)| (name.to_string(), container))
        .collect();

    move |path: &Path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        fixtures
            .get(&name)
            .cloned()
            .ok_or_else(|| XdmfError::Container {
                file: path.display().to_string(),
                message: "not a libSplash container".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splash_xdmf::Container;

    #[test]
    fn test_single_iteration_layout() {
        let container = single_iteration_fields();
        let members = container.members("/data").unwrap().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(container.datasets().len(), 3);
    }

    #[test]
    fn test_fixture_opener_unknown_name() {
        let mut open = fixture_opener(vec![("run_0.h5", series_member(0))]);
        assert!(open(Path::new("/tmp/run_0.h5")).is_ok());
        assert!(matches!(
            open(Path::new("/tmp/other.h5")),
            Err(XdmfError::Container { .. })
        ));
    }
}
