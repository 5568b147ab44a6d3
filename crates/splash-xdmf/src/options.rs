//! Conversion options and their YAML configuration file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{XdmfError, XdmfResult};

/// Extension every XDMF output file carries.
pub const XMF_EXTENSION: &str = ".xmf";

/// How a conversion run is performed and where it writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Aggregate every file of the input's `<stem>_<index>.h5` series
    pub time_series: bool,
    /// Reference containers by absolute path instead of file name
    pub full_paths: bool,
    /// Write grids and polys to separate documents
    pub split: bool,
    /// Explicit output path (base path in split mode)
    pub output: Option<PathBuf>,
}

impl ConvertOptions {
    /// Load options from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> XdmfResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: ConvertOptions = serde_yaml::from_str(&content)?;
        Ok(options)
    }

    /// Check option combinations before any input is touched.
    pub fn validate(&self) -> XdmfResult<()> {
        if let Some(output) = &self.output {
            if output.as_os_str().is_empty() {
                return Err(XdmfError::InvalidConfig(
                    "output path must not be empty".to_string(),
                ));
            }
            if self.split && !output.to_string_lossy().ends_with(XMF_EXTENSION) {
                return Err(XdmfError::InvalidOutputPath {
                    path: output.display().to_string(),
                    reason: format!("split output requires a '{}' suffix", XMF_EXTENSION),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConvertOptions::default();
        assert!(!options.time_series);
        assert!(!options.full_paths);
        assert!(!options.split);
        assert!(options.output.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("convert.yaml");
        std::fs::write(&path, "time_series: true\nsplit: true\noutput: out/sim.xmf\n").unwrap();

        let options = ConvertOptions::from_file(&path).unwrap();
        assert!(options.time_series);
        assert!(options.split);
        assert!(!options.full_paths);
        assert_eq!(options.output, Some(PathBuf::from("out/sim.xmf")));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("convert.yaml");
        std::fs::write(&path, "timeseries: true\n").unwrap();
        assert!(matches!(
            ConvertOptions::from_file(&path),
            Err(XdmfError::Yaml(_))
        ));
    }

    #[test]
    fn test_split_requires_xmf_suffix() {
        let options = ConvertOptions {
            split: true,
            output: Some(PathBuf::from("result.xml")),
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(XdmfError::InvalidOutputPath { .. })
        ));

        // Merged output accepts any name
        let options = ConvertOptions {
            output: Some(PathBuf::from("result.xml")),
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }
}
