use std::path::{Path, PathBuf};

use crate::error::VisError;

/// Runtime configuration for the visualization pipeline.
///
/// Constructed once at process start and passed into every entry point;
/// there is no process-global mutable state. Paths default to the
/// repository-local conventions and can be overridden through the
/// ERA5VIS_* environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// Case dataset (one timestep of ERA5 pressure-level data)
    pub datafile: PathBuf,
    /// Monthly climatology dataset (month = 1..12)
    pub climfile: PathBuf,
    /// Terrain height dataset, optional (variable "z" in meters)
    pub terrainfile: Option<PathBuf>,
    /// Directory for generated PNG images
    pub png_dir: PathBuf,
    /// Directory for generated HTML pages
    pub html_dir: PathBuf,
    /// Reference period string shown in climatology/anomaly titles
    pub clim_ref_period: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            datafile: PathBuf::from("./era5_example_dataset.nc"),
            climfile: PathBuf::from("./data/model_clim.nc"),
            terrainfile: Some(PathBuf::from("./data/model_terrain/DEM.nc")),
            png_dir: PathBuf::from("PNG"),
            html_dir: PathBuf::from("html"),
            clim_ref_period: String::from("1991\u{2013}2020"),
        }
    }
}

impl Config {
    /// Build a configuration from defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(p) = std::env::var("ERA5VIS_DATAFILE") {
            config.datafile = PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("ERA5VIS_CLIMFILE") {
            config.climfile = PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("ERA5VIS_TERRAINFILE") {
            config.terrainfile = if p.is_empty() {
                None
            } else {
                Some(PathBuf::from(p))
            };
        }
        if let Ok(p) = std::env::var("ERA5VIS_PNG_DIR") {
            config.png_dir = PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("ERA5VIS_HTML_DIR") {
            config.html_dir = PathBuf::from(p);
        }
        config
    }

    /// Check that the case data file exists.
    ///
    /// Run before any extraction so the user gets a clear message instead
    /// of a low-level open failure.
    pub fn validate(&self) -> Result<(), VisError> {
        if !self.datafile.exists() {
            return Err(VisError::FileNotFound(self.datafile.clone()));
        }
        Ok(())
    }

    /// Configuration pointing at an explicit case file, for tests and
    /// library callers that bypass the environment.
    pub fn with_datafile(datafile: impl AsRef<Path>) -> Self {
        Self {
            datafile: datafile.as_ref().to_path_buf(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.png_dir, PathBuf::from("PNG"));
        assert_eq!(config.html_dir, PathBuf::from("html"));
        assert!(config.terrainfile.is_some());
    }

    #[test]
    fn test_validate_missing_datafile() {
        let config = Config::with_datafile("nonexistent_path_12345.nc");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_with_datafile_keeps_other_defaults() {
        let config = Config::with_datafile("case.nc");
        assert_eq!(config.datafile, PathBuf::from("case.nc"));
        assert_eq!(config.climfile, Config::default().climfile);
    }
}
