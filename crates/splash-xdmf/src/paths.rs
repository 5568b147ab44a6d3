//! Path and filename utilities.
//!
//! libSplash writes one file per iteration named `<stem>_<index>.h5` and
//! stores datasets below `/data/<iteration>/`. These helpers derive display
//! names, series stems and cross-reference filenames from those conventions.

use std::path::{is_separator, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{XdmfError, XdmfResult};

/// Extension of libSplash container files.
pub const H5_EXTENSION: &str = ".h5";

/// Top-level group holding the iteration group.
pub const DATA_GROUP: &str = "data";

/// Strip the `data/<iteration>/` prefix from a dataset path.
///
/// A leading `/` is tolerated. Paths without the prefix are returned unchanged.
pub fn display_name(path: &str) -> &str {
    let relative = path.strip_prefix('/').unwrap_or(path);
    if let Some(rest) = relative
        .strip_prefix(DATA_GROUP)
        .and_then(|r| r.strip_prefix('/'))
    {
        if let Some(pos) = rest.find('/') {
            if pos > 0 && pos + 1 < rest.len() {
                return &rest[pos + 1..];
            }
        }
    }
    path
}

/// Common stem of a time-series file: `run_7.h5` -> `run`.
///
/// Filenames that do not end in `_<digits>.h5` are returned unchanged.
pub fn common_name(filename: &str) -> String {
    match split_series_name(filename) {
        Some((stem, _)) => stem.to_string(),
        None => filename.to_string(),
    }
}

fn split_series_name(filename: &str) -> Option<(&str, u64)> {
    let without_ext = filename.strip_suffix(H5_EXTENSION)?;
    let pos = without_ext.rfind('_')?;
    let (stem, digits) = (&without_ext[..pos], &without_ext[pos + 1..]);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if stem.is_empty() || stem.ends_with(is_separator) {
        return None;
    }

    let index = digits.parse().ok()?;
    Some((stem, index))
}

/// Find every file of the series `path` belongs to.
///
/// Siblings in the same directory sharing the stem are returned ordered by
/// their numeric index. A path that is not named like a series member is
/// returned on its own.
pub fn discover_series(path: &Path) -> XdmfResult<Vec<PathBuf>> {
    let stem = match path
        .file_name()
        .and_then(|s| s.to_str())
        .and_then(split_series_name)
    {
        Some((stem, _)) => stem.to_string(),
        None => return Ok(vec![path.to_path_buf()]),
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut members = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| XdmfError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if let Some((member_stem, index)) = split_series_name(name) {
            if member_stem == stem {
                members.push((index, entry.into_path()));
            }
        }
    }

    if members.is_empty() {
        return Ok(vec![path.to_path_buf()]);
    }

    members.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(members.into_iter().map(|(_, p)| p).collect())
}

/// Filename written in front of `:` in dataset cross-references.
///
/// With `full_paths` the absolute path is used, otherwise only the file name,
/// which resolves relative to an output document placed next to the input.
pub fn reference_filename(path: &Path, full_paths: bool) -> XdmfResult<String> {
    if full_paths {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        return Ok(absolute.to_string_lossy().into_owned());
    }

    Ok(path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("data/42/deep/folders/x"), "deep/folders/x");
        assert_eq!(display_name("/data/5/fields/Ex"), "fields/Ex");
        assert_eq!(display_name("other/42/x"), "other/42/x");
        assert_eq!(display_name("data/42"), "data/42");
        assert_eq!(display_name("data/42/"), "data/42/");
        assert_eq!(display_name("x"), "x");
    }

    #[test]
    fn test_common_name() {
        assert_eq!(common_name("run_7.h5"), "run");
        assert_eq!(common_name("my_sim_0100.h5"), "my_sim");
        assert_eq!(common_name("out/run_3.h5"), "out/run");
        assert_eq!(common_name("plain.h5"), "plain.h5");
        assert_eq!(common_name("run_x.h5"), "run_x.h5");
        assert_eq!(common_name("run_7.nc"), "run_7.nc");
        assert_eq!(common_name("_7.h5"), "_7.h5");
        assert_eq!(common_name("run_.h5"), "run_.h5");
    }

    #[test]
    fn test_reference_filename() {
        let path = Path::new("some/dir/run_1.h5");
        assert_eq!(reference_filename(path, false).unwrap(), "run_1.h5");

        let full = reference_filename(path, true).unwrap();
        assert!(Path::new(&full).is_absolute());
        assert!(full.ends_with("run_1.h5"));

        let abs = Path::new("/tmp/run_1.h5");
        assert_eq!(reference_filename(abs, true).unwrap(), "/tmp/run_1.h5");
    }

    #[test]
    fn test_discover_series_orders_by_index() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "run_10.h5", "run_2.h5", "run_0.h5", "run_0005.h5", "other_1.h5", "run.h5", "run_3.txt",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let found = discover_series(&dir.path().join("run_2.h5")).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["run_0.h5", "run_2.h5", "run_0005.h5", "run_10.h5"]);
    }

    #[test]
    fn test_discover_series_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.h5");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(discover_series(&path).unwrap(), vec![path]);
    }
}
