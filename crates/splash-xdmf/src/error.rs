//! Error types for the conversion engine.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using XdmfError.
pub type XdmfResult<T> = Result<T, XdmfError>;

/// Errors that stop a container (or the whole run) from contributing output.
#[derive(Debug, Error)]
pub enum XdmfError {
    // === Input Errors ===
    #[error("Input file does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Could not find root data group in '{file}'")]
    MissingDataRoot { file: String },

    #[error("Expected exactly one iteration group below /data in '{file}', found {found}")]
    IterationCount { file: String, found: usize },

    #[error("Failed to read container '{file}': {message}")]
    Container { file: String, message: String },

    #[error("None of the input files contained usable data")]
    NoUsableInput,

    // === Output Errors ===
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: String, reason: String },

    #[error("Failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl XdmfError {
    /// Whether the run may continue with the next container after this error.
    ///
    /// Only conditions scoped to one container are recoverable; missing input
    /// files and output problems abort the run.
    pub fn is_container_local(&self) -> bool {
        matches!(
            self,
            XdmfError::MissingDataRoot { .. }
                | XdmfError::IterationCount { .. }
                | XdmfError::Container { .. }
        )
    }
}

/// Advisory condition for a single dataset.
///
/// The dataset is left out of the output; sibling datasets and already built
/// geometry nodes are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The dataset's element type has no XDMF number type.
    UnsupportedType { dataset: String, dtype: String },
    /// A grid dataset of rank 0 or above 3, which no co-rectilinear mesh describes.
    UnsupportedRank { dataset: String, rank: usize },
}

impl Diagnostic {
    /// Path of the dataset this diagnostic is about.
    pub fn dataset(&self) -> &str {
        match self {
            Diagnostic::UnsupportedType { dataset, .. } => dataset,
            Diagnostic::UnsupportedRank { dataset, .. } => dataset,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedType { dataset, dtype } => {
                write!(f, "unsupported element type {} for dataset {}", dtype, dataset)
            }
            Diagnostic::UnsupportedRank { dataset, rank } => {
                write!(f, "cannot describe {}-dimensional grid dataset {}", rank, dataset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_local_errors() {
        let err = XdmfError::MissingDataRoot {
            file: "a.h5".to_string(),
        };
        assert!(err.is_container_local());

        let err = XdmfError::IterationCount {
            file: "a.h5".to_string(),
            found: 2,
        };
        assert!(err.is_container_local());

        assert!(!XdmfError::MissingInput(PathBuf::from("a.h5")).is_container_local());
        assert!(!XdmfError::NoUsableInput.is_container_local());
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::UnsupportedType {
            dataset: "/data/5/fields/flags".to_string(),
            dtype: "Int8".to_string(),
        };
        assert_eq!(diag.dataset(), "/data/5/fields/flags");
        assert!(diag.to_string().contains("Int8"));
    }
}
