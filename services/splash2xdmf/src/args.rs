//! Command-line arguments and their merge with the YAML configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use splash_xdmf::ConvertOptions;

#[derive(Parser, Debug)]
#[command(name = "splash2xdmf")]
#[command(about = "Create an XDMF description of libSplash HDF5 output", long_about = None)]
pub struct Args {
    /// libSplash HDF5 file (any member of the series in time-series mode)
    pub input: PathBuf,

    /// Log every group and dataset visited
    #[arg(short, long)]
    pub verbose: bool,

    /// Output file (base name in split mode, must end in .xmf)
    #[arg(short, long, env = "SPLASH2XDMF_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Aggregate all files <stem>_<index>.h5 next to the input
    #[arg(short, long)]
    pub time_series: bool,

    /// Reference containers by absolute path
    #[arg(long)]
    pub fullpath: bool,

    /// Write grids and polys to separate files
    #[arg(short, long)]
    pub split: bool,

    /// YAML file with default conversion options
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Conversion options: the config file (if any) with flags applied on top.
    pub fn options(&self) -> Result<ConvertOptions> {
        let mut options = match &self.config {
            Some(path) => ConvertOptions::from_file(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => ConvertOptions::default(),
        };

        options.time_series |= self.time_series;
        options.full_paths |= self.fullpath;
        options.split |= self.split;
        if let Some(output) = &self.output {
            options.output = Some(output.clone());
        }

        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "splash2xdmf",
            "sim_0.h5",
            "-t",
            "--fullpath",
            "-s",
            "-o",
            "out/sim.xmf",
        ])
        .unwrap();
        assert_eq!(args.input, PathBuf::from("sim_0.h5"));
        assert!(!args.verbose);

        let options = args.options().unwrap();
        assert!(options.time_series);
        assert!(options.full_paths);
        assert!(options.split);
        assert_eq!(options.output, Some(PathBuf::from("out/sim.xmf")));
    }

    #[test]
    fn test_input_required() {
        assert!(Args::try_parse_from(["splash2xdmf"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("convert.yaml");
        std::fs::write(&config, "full_paths: true\noutput: from_config.xmf\n").unwrap();

        let args = Args::try_parse_from([
            "splash2xdmf",
            "sim_0.h5",
            "-c",
            config.to_str().unwrap(),
            "-o",
            "from_flag.xmf",
        ])
        .unwrap();
        let options = args.options().unwrap();
        assert!(options.full_paths);
        assert!(!options.time_series);
        assert_eq!(options.output, Some(PathBuf::from("from_flag.xmf")));
    }

    #[test]
    fn test_split_with_bad_output_rejected() {
        let args =
            Args::try_parse_from(["splash2xdmf", "sim_0.h5", "-s", "-o", "out.xml"]).unwrap();
        assert!(args.options().is_err());
    }
}
