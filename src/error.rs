use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the era5vis library.
///
/// Every error is terminal for the current operation; there are no retries.
/// CLI front ends print these and exit, library callers match on them.
#[derive(Error, Debug)]
pub enum VisError {
    #[error("NetCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data file does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("Parameter '{name}' not found in {dataset}. Available parameters: {available:?}")]
    MissingVariable {
        name: String,
        dataset: String,
        available: Vec<String>,
    },

    #[error("Dataset does not have '{0}' dimension")]
    MissingDimension(String),

    #[error("Pressure level {level} hPa not found in dataset. Available levels: {available:?}")]
    LevelNotFound { level: f64, available: Vec<f64> },

    #[error("Month {month} not found in climatology. Available months: {available:?}")]
    MonthNotFound { month: u32, available: Vec<u32> },

    #[error("Time '{time}' not found in dataset. Available time range: {first} to {last}")]
    TimeNotFound {
        time: String,
        first: String,
        last: String,
    },

    #[error("Time index {index} out of range. Valid range: 0 to {max}")]
    TimeIndexOutOfRange { index: usize, max: usize },

    #[error("Case dataset has no 'valid_time' or 'time' coordinate")]
    MissingTimeCoordinate,

    #[error("Invalid datetime format: {0}. Expected: YYYYmmddHHMM")]
    DateTimeFormat(String),

    #[error("Could not parse month '{0}'. Use a number (1-12) or name (e.g. 'January', 'März')")]
    InvalidMonth(String),

    #[error("field must be one of: 'anomaly', 'case', 'clim'; got '{0}'")]
    InvalidDisplayMode(String),

    #[error("Case and climatology grids do not match on '{axis}': cannot align exactly")]
    AlignmentMismatch { axis: String },

    #[error("Variable '{0}' has unexpected dimensions {1:?}")]
    UnexpectedShape(String, Vec<usize>),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Download error: {0}")]
    Download(#[from] reqwest::Error),

    #[error("CDSAPI_KEY environment variable is not set")]
    MissingCredentials,
}
