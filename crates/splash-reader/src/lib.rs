//! libSplash HDF5 container access.
//!
//! Opens a libSplash output file through the `netcdf` crate (libnetcdf reads
//! plain HDF5 files as netCDF-4) and exposes its group hierarchy to the
//! conversion engine as a [`Container`].
//!
//! # System requirements
//!
//! Linking needs `libnetcdf` and `libhdf5` (e.g. `libnetcdf-dev libhdf5-dev`).

pub mod error;
pub mod native;

use std::path::{Path, PathBuf};

use splash_xdmf::container::join_path;
use splash_xdmf::{Container, DatasetRef, Entry, XdmfResult};
use tracing::debug;

pub use error::{ReadError, ReadResult};
pub use native::{attribute_value, native_type, silence_hdf5_errors};

/// An open libSplash file. The underlying handle is closed on drop.
pub struct SplashFile {
    path: PathBuf,
    file: netcdf::File,
}

impl std::fmt::Debug for SplashFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplashFile").field("path", &self.path).finish()
    }
}

impl SplashFile {
    /// Open `path` read-only.
    pub fn open(path: impl AsRef<Path>) -> ReadResult<Self> {
        let path = path.as_ref();
        let file = netcdf::open(path).map_err(|source| ReadError::Open {
            path: path.display().to_string(),
            source,
        })?;

        if file.root().is_none() {
            return Err(ReadError::NotHdf5 {
                path: path.display().to_string(),
            });
        }

        debug!(path = %path.display(), "Opened container");
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Opener suitable for [`splash_xdmf::convert`].
    pub fn open_container(path: &Path) -> XdmfResult<Self> {
        Ok(Self::open(path)?)
    }

    fn read_dataset(&self, group: &str, var: &netcdf::Variable) -> DatasetRef {
        let shape = var.dimensions().iter().map(|d| d.len()).collect();
        let mut dataset = DatasetRef::new(
            join_path(group, &var.name()),
            shape,
            native_type(&var.vartype()),
        );

        for attr in var.attributes() {
            match attr.value() {
                Ok(value) => {
                    dataset = dataset.with_attribute(attr.name(), attribute_value(value));
                }
                Err(e) => debug!(
                    dataset = %dataset.path,
                    attribute = attr.name(),
                    error = %e,
                    "Unreadable attribute"
                ),
            }
        }
        dataset
    }
}

impl Container for SplashFile {
    fn members(&self, group: &str) -> XdmfResult<Option<Vec<Entry>>> {
        let relative = group.trim_matches('/');
        let found = if relative.is_empty() {
            self.file.root()
        } else {
            match self.file.group(relative) {
                Ok(found) => found,
                Err(netcdf::Error::NotFound(_)) => None,
                Err(source) => {
                    return Err(ReadError::Group {
                        path: self.path.display().to_string(),
                        group: group.to_string(),
                        source,
                    }
                    .into())
                }
            }
        };

        let Some(found) = found else {
            return Ok(None);
        };

        let mut entries: Vec<Entry> = found.groups().map(|g| Entry::Group(g.name())).collect();
        for var in found.variables() {
            entries.push(Entry::Dataset(self.read_dataset(group, &var)));
        }
        Ok(Some(entries))
    }
}
