//! Error types for reading libSplash containers.

use splash_xdmf::XdmfError;
use thiserror::Error;

/// Result type for container reads.
pub type ReadResult<T> = Result<T, ReadError>;

/// Error types for HDF5 container access.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The file could not be opened by the netcdf/HDF5 library
    #[error("Cannot open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: netcdf::Error,
    },

    /// The file opened but has no HDF5 group hierarchy
    #[error("'{path}' is not an HDF5 (netCDF-4) container")]
    NotHdf5 { path: String },

    /// A group lookup failed inside the library
    #[error("Cannot read group '{group}' in '{path}': {source}")]
    Group {
        path: String,
        group: String,
        #[source]
        source: netcdf::Error,
    },
}

impl ReadError {
    pub fn path(&self) -> &str {
        match self {
            ReadError::Open { path, .. }
            | ReadError::NotHdf5 { path }
            | ReadError::Group { path, .. } => path,
        }
    }
}

impl From<ReadError> for XdmfError {
    fn from(err: ReadError) -> Self {
        XdmfError::Container {
            file: err.path().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_container_error() {
        let err = ReadError::NotHdf5 {
            path: "sim_0.h5".to_string(),
        };
        let converted: XdmfError = err.into();
        assert!(converted.is_container_local());
        match converted {
            XdmfError::Container { file, message } => {
                assert_eq!(file, "sim_0.h5");
                assert!(message.contains("not an HDF5"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
